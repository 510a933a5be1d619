//! Typed views of flat object keys.

use serde::{Deserialize, Serialize};

use crate::CanonicalRoot;

/// A flat object key split into its agency, docket and remainder parts.
///
/// Produced from keys shaped `{agency}/{docketId}/{remainder}`. No case
/// normalization or trimming is applied; the parts are exactly the text
/// between the first two `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedKey {
    /// First segment (e.g., "USTR")
    pub agency: String,

    /// Second segment (e.g., "USTR-2015-0010")
    pub docket_id: String,

    /// Everything after the second `/`, verbatim (may be empty or contain `/`)
    pub remainder: String,
}

impl ParsedKey {
    /// Create a parsed key from its parts.
    pub fn new(
        agency: impl Into<String>,
        docket_id: impl Into<String>,
        remainder: impl Into<String>,
    ) -> Self {
        Self {
            agency: agency.into(),
            docket_id: docket_id.into(),
            remainder: remainder.into(),
        }
    }

    /// Iterate over the `/`-delimited segments of the remainder.
    pub fn remainder_segments(&self) -> impl Iterator<Item = &str> {
        self.remainder.split('/')
    }
}

/// Classification of a flat object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClass {
    /// Key is already under a canonical root and must not be moved
    AlreadyCanonical(CanonicalRoot),

    /// Key has at least three segments
    Parsed(ParsedKey),

    /// Key has fewer than three segments; kept verbatim
    Unparseable(String),
}

impl KeyClass {
    /// Whether this key should be relocated.
    pub fn is_eligible(&self) -> bool {
        !matches!(self, KeyClass::AlreadyCanonical(_))
    }
}
