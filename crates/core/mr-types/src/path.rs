//! Canonical destination paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CanonicalRoot;

/// A canonical destination key produced by path resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationPath(String);

impl DestinationPath {
    /// Wrap an already-resolved key.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical root this path lives under, if any.
    pub fn root(&self) -> Option<CanonicalRoot> {
        CanonicalRoot::of_key(&self.0)
    }

    /// The folder containing this path, including the trailing `/`.
    ///
    /// Returns `None` for a path without any `/`.
    pub fn parent_prefix(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..=idx])
    }

    /// Consume the path and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DestinationPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for DestinationPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl PartialEq<str> for DestinationPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DestinationPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// All paths resolved for one structured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaths {
    /// Path for the record's metadata JSON
    pub metadata_path: DestinationPath,

    /// One path per attachment URL, in input order
    pub attachment_paths: Vec<DestinationPath>,
}

impl RecordPaths {
    /// Iterate over every path, metadata first.
    pub fn iter(&self) -> impl Iterator<Item = &DestinationPath> {
        std::iter::once(&self.metadata_path).chain(self.attachment_paths.iter())
    }
}
