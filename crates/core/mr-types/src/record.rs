//! Structured regulatory records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structured record.
///
/// Deserializes from the plural names the upstream API uses (`dockets`,
/// `documents`, `comments`) and accepts singular aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A docket (the container for documents and comments)
    #[serde(rename = "dockets", alias = "docket")]
    Docket,

    /// A document posted to a docket
    #[serde(rename = "documents", alias = "document")]
    Document,

    /// A public comment on a docket
    #[serde(rename = "comments", alias = "comment")]
    Comment,
}

impl RecordType {
    /// Parse a record type from its API name.
    pub fn from_api_name(name: &str) -> Option<RecordType> {
        match name {
            "dockets" | "docket" => Some(RecordType::Docket),
            "documents" | "document" => Some(RecordType::Document),
            "comments" | "comment" => Some(RecordType::Comment),
            _ => None,
        }
    }

    /// The storage category folder for this record type.
    pub fn category(&self) -> &'static str {
        match self {
            RecordType::Docket => "docket",
            RecordType::Document => "documents",
            RecordType::Comment => "comments",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// A structured record extracted from an upstream JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record identifier (e.g., "USTR-2015-0010-0002")
    pub id: String,

    /// Record type
    pub record_type: RecordType,

    /// Agency identifier (e.g., "USTR")
    pub agency_id: String,

    /// Docket identifier (e.g., "USTR-2015-0010")
    pub docket_id: String,

    /// Attachment file URLs in envelope order
    #[serde(default)]
    pub attachment_file_urls: Vec<String>,
}

impl Record {
    /// Create a record without attachments.
    pub fn new(
        id: impl Into<String>,
        record_type: RecordType,
        agency_id: impl Into<String>,
        docket_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type,
            agency_id: agency_id.into(),
            docket_id: docket_id.into(),
            attachment_file_urls: Vec::new(),
        }
    }

    /// Add an attachment URL.
    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachment_file_urls.push(url.into());
        self
    }
}
