//! mr-resolver - canonical path resolution for the object store reorganizer.
//!
//! Maps an input to the key it should live at under the two-tier
//! `raw-data/` / `derived-data/` hierarchy:
//!
//! - Flat object keys (`{agency}/{docketId}/{remainder}`) are parsed by
//!   [`parse_key`] and resolved by [`resolve_key`]
//! - Structured JSON records are parsed by [`parse_record_json`] and resolved
//!   by [`resolve_record`] into a metadata path plus one path per attachment
//!
//! Resolution is pure: no I/O, and the same input always yields the same path.
//!
//! # Example
//!
//! ```
//! use mr_resolver::{resolve_key, resolve_record_json};
//!
//! let dest = resolve_key("USTR/USTR-2015-0010/some_subfolder_extracted_text/foo/bar.txt");
//! assert_eq!(
//!     dest.as_str(),
//!     "derived-data/USTR/USTR-2015-0010/Mirrulations/extracted_txt/some_subfolder_extracted_text/foo/bar.txt"
//! );
//!
//! let paths = resolve_record_json(
//!     r#"{"data": {"id": "USTR-2015-0010", "type": "dockets",
//!         "attributes": {"agencyId": "USTR", "docketId": "USTR-2015-0010"}}}"#,
//! )
//! .unwrap();
//! assert_eq!(
//!     paths.metadata_path.as_str(),
//!     "raw-data/USTR/USTR-2015-0010/text-USTR-2015-0010/docket/USTR-2015-0010.json"
//! );
//! ```

use mr_error::RecordError;
use mr_types::RecordPaths;

pub mod key;
pub mod record;
pub mod resolver;

pub use key::{classify_key, parse_key};
pub use record::{parse_record_json, parse_record_value};
pub use resolver::{
    EXTRACTED_TEXT_MARKER, EXTRACTED_TEXT_ROOT, attachment_basename, attachment_path,
    metadata_path, resolve_key, resolve_key_class, resolve_parsed_key, resolve_record,
};

/// Parse a JSON record envelope and resolve all of its paths.
pub fn resolve_record_json(json: &str) -> Result<RecordPaths, RecordError> {
    parse_record_json(json).map(|record| resolve_record(&record))
}

/// Resolve all paths for an already-decoded JSON record envelope.
pub fn resolve_record_value(value: &serde_json::Value) -> Result<RecordPaths, RecordError> {
    parse_record_value(value).map(|record| resolve_record(&record))
}
