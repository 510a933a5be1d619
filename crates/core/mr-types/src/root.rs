//! Canonical namespace roots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two top-level namespaces objects are organized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalRoot {
    /// `raw-data/` - records and files as ingested
    RawData,

    /// `derived-data/` - content produced from raw data (extracted text)
    DerivedData,
}

impl CanonicalRoot {
    /// All canonical roots, in namespace order.
    pub const ALL: [CanonicalRoot; 2] = [CanonicalRoot::RawData, CanonicalRoot::DerivedData];

    /// The root folder name without the trailing delimiter.
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalRoot::RawData => "raw-data",
            CanonicalRoot::DerivedData => "derived-data",
        }
    }

    /// The key prefix for this root, including the trailing `/`.
    pub fn prefix(&self) -> &'static str {
        match self {
            CanonicalRoot::RawData => "raw-data/",
            CanonicalRoot::DerivedData => "derived-data/",
        }
    }

    /// Returns the root a key already lives under, if any.
    pub fn of_key(key: &str) -> Option<CanonicalRoot> {
        Self::ALL.into_iter().find(|root| key.starts_with(root.prefix()))
    }
}

impl fmt::Display for CanonicalRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check whether a key is already under a canonical root.
pub fn is_canonical(key: &str) -> bool {
    CanonicalRoot::of_key(key).is_some()
}
