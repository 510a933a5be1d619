//! Structured record parsing.
//!
//! Records arrive as JSON envelopes shaped like:
//!
//! ```json
//! {
//!   "data": {
//!     "id": "FDA-2017-D-2335-1566",
//!     "type": "comments",
//!     "attributes": { "agencyId": "FDA", "docketId": "FDA-2017-D-2335" }
//!   },
//!   "included": [
//!     { "attributes": { "fileFormats": [ { "fileUrl": "https://.../attachment_1.pdf" } ] } }
//!   ]
//! }
//! ```

use mr_error::RecordError;
use mr_types::{Record, RecordType};
use serde_json::Value;

/// Parse a record from JSON text.
pub fn parse_record_json(json: &str) -> Result<Record, RecordError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| RecordError::Json(e.to_string()))?;
    parse_record_value(&value)
}

/// Parse a record from a decoded JSON envelope.
///
/// Requires `data.id`, `data.type`, `data.attributes.agencyId` and
/// `data.attributes.docketId` to be strings. Attachment URLs are collected
/// from `included[].attributes.fileFormats[].fileUrl` in envelope order;
/// a missing or null `included`, `attributes` or `fileFormats` contributes
/// nothing.
pub fn parse_record_value(value: &Value) -> Result<Record, RecordError> {
    if !value.is_object() {
        return Err(RecordError::Json("record envelope is not an object".to_string()));
    }

    let data = value.get("data").ok_or(RecordError::MissingField("data"))?;
    let id = required_str(data, &["id"], "data.id")?;
    let type_name = required_str(data, &["type"], "data.type")?;
    let agency_id = required_str(data, &["attributes", "agencyId"], "data.attributes.agencyId")?;
    let docket_id = required_str(data, &["attributes", "docketId"], "data.attributes.docketId")?;

    let record_type = RecordType::from_api_name(type_name)
        .ok_or_else(|| RecordError::UnknownType(type_name.to_string()))?;

    Ok(Record {
        id: id.to_string(),
        record_type,
        agency_id: agency_id.to_string(),
        docket_id: docket_id.to_string(),
        attachment_file_urls: attachment_urls(value),
    })
}

/// Walk `path` from `root` and require a string at the end.
fn required_str<'a>(
    root: &'a Value,
    path: &[&str],
    field: &'static str,
) -> Result<&'a str, RecordError> {
    path.iter()
        .try_fold(root, |node, name| node.get(*name))
        .and_then(Value::as_str)
        .ok_or(RecordError::MissingField(field))
}

fn attachment_urls(envelope: &Value) -> Vec<String> {
    let Some(included) = envelope.get("included").and_then(Value::as_array) else {
        return Vec::new();
    };

    included
        .iter()
        .filter_map(|item| item.get("attributes"))
        .filter_map(|attrs| attrs.get("fileFormats").and_then(Value::as_array))
        .flatten()
        .filter_map(|format| format.get("fileUrl").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
