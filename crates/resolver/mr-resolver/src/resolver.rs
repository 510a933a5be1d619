//! Canonical path resolution.
//!
//! Produces the bit-exact path grammar consumed by downstream tooling:
//!
//! ```text
//! raw-data/{agency}/{docketId}/text-{docketId}/docket/{id}.json
//! raw-data/{agency}/{docketId}/text-{docketId}/documents/{id}.json
//! raw-data/{agency}/{docketId}/text-{docketId}/comments/{id}.json
//! raw-data/{agency}/{docketId}/binary-{docketId}/comments_attachments/{id}_{basename}
//! raw-data/{agency}/{docketId}/{remainder}
//! derived-data/{agency}/{docketId}/Mirrulations/extracted_txt/{root}/{subpath}
//! ```

use mr_types::{CanonicalRoot, DestinationPath, KeyClass, ParsedKey, Record, RecordPaths};

use crate::key::classify_key;

/// Substring that marks a remainder segment as extracted text.
pub const EXTRACTED_TEXT_MARKER: &str = "extracted_text";

/// Folder under `derived-data/{agency}/{docketId}/` holding extracted text.
pub const EXTRACTED_TEXT_ROOT: &str = "Mirrulations/extracted_txt";

/// Resolve a flat key to its canonical destination.
///
/// Keys already under a canonical root resolve to themselves.
pub fn resolve_key(key: &str) -> DestinationPath {
    match classify_key(key) {
        KeyClass::AlreadyCanonical(_) => DestinationPath::new(key),
        class => resolve_key_class(&class),
    }
}

/// Resolve a classified key.
///
/// [`KeyClass::AlreadyCanonical`] carries no key text; it resolves to the
/// bare root prefix, so callers holding the key should use [`resolve_key`].
pub fn resolve_key_class(class: &KeyClass) -> DestinationPath {
    match class {
        KeyClass::Parsed(parsed) => resolve_parsed_key(parsed),
        KeyClass::Unparseable(key) => raw_data_verbatim(key),
        KeyClass::AlreadyCanonical(root) => DestinationPath::new(root.prefix()),
    }
}

/// Resolve a parsed key.
///
/// The remainder's segments are scanned left to right; the first segment
/// whose name contains [`EXTRACTED_TEXT_MARKER`] is the split point. The
/// matched segment and everything after it are kept verbatim under the
/// derived-data extracted text root; segments before it are dropped. Later
/// segments that also contain the marker are ordinary path text. Without a
/// match the key goes under `raw-data/` unchanged.
pub fn resolve_parsed_key(parsed: &ParsedKey) -> DestinationPath {
    match extracted_text_offset(parsed) {
        Some(offset) => DestinationPath::new(format!(
            "{}{}/{}/{}/{}",
            CanonicalRoot::DerivedData.prefix(),
            parsed.agency,
            parsed.docket_id,
            EXTRACTED_TEXT_ROOT,
            &parsed.remainder[offset..]
        )),
        None => DestinationPath::new(format!(
            "{}{}/{}/{}",
            CanonicalRoot::RawData.prefix(),
            parsed.agency,
            parsed.docket_id,
            parsed.remainder
        )),
    }
}

/// Byte offset of the first remainder segment containing the marker.
fn extracted_text_offset(parsed: &ParsedKey) -> Option<usize> {
    let mut offset = 0;
    for segment in parsed.remainder_segments() {
        if segment.contains(EXTRACTED_TEXT_MARKER) {
            return Some(offset);
        }
        offset += segment.len() + 1;
    }
    None
}

fn raw_data_verbatim(key: &str) -> DestinationPath {
    DestinationPath::new(format!("{}{}", CanonicalRoot::RawData.prefix(), key))
}

/// Resolve the metadata path and every attachment path of a record.
pub fn resolve_record(record: &Record) -> RecordPaths {
    RecordPaths {
        metadata_path: metadata_path(record),
        attachment_paths: record
            .attachment_file_urls
            .iter()
            .map(|url| attachment_path(record, url))
            .collect(),
    }
}

/// `raw-data/{agencyId}/{docketId}/text-{docketId}/{category}/{id}.json`
pub fn metadata_path(record: &Record) -> DestinationPath {
    DestinationPath::new(format!(
        "{}{}/{}/text-{}/{}/{}.json",
        CanonicalRoot::RawData.prefix(),
        record.agency_id,
        record.docket_id,
        record.docket_id,
        record.record_type.category(),
        record.id
    ))
}

/// `raw-data/{agencyId}/{docketId}/binary-{docketId}/{category}_attachments/{id}_{basename}`
///
/// The record id prefix keeps attachments from different records that share
/// a file name apart.
pub fn attachment_path(record: &Record, url: &str) -> DestinationPath {
    DestinationPath::new(format!(
        "{}{}/{}/binary-{}/{}_attachments/{}_{}",
        CanonicalRoot::RawData.prefix(),
        record.agency_id,
        record.docket_id,
        record.docket_id,
        record.record_type.category(),
        record.id,
        attachment_basename(url)
    ))
}

/// The final path segment of an attachment URL.
///
/// Query string and fragment are ignored, as is a trailing `/`.
pub fn attachment_basename(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}
