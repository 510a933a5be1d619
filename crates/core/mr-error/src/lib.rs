//! Error types and classification for the object store reorganizer.
//!
//! This crate provides:
//! - [`MrError`] - Top-level error enum for resolution and migration errors
//! - [`StoreError`] - Object store failures with a stable [`StoreErrorKind`]
//! - [`RecordError`] - Malformed structured records
//! - [`ErrorCategory`] for retry decision making

use std::fmt;

use thiserror::Error;

/// Top-level error type for the reorganizer.
#[derive(Error, Debug)]
pub enum MrError {
    /// Object store errors (list, copy, delete, put)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Structured record errors (missing fields, bad JSON)
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Stable discriminant for object store failures.
///
/// Provider errors are mapped onto this closed set once, at the client
/// boundary. Everything downstream matches on the kind, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Source key or bucket absent
    NotFound,

    /// Permission failure on copy, delete or list
    AccessDenied,

    /// Network or service errors not classified above
    TransientProvider,

    /// Any other client-side rejection (bad request, invalid key, ...)
    OtherClient,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NotFound"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::TransientProvider => write!(f, "TransientProvider"),
            Self::OtherClient => write!(f, "OtherClient"),
        }
    }
}

/// Object store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key or bucket not found
    #[error("Object not found: {key}: {message}")]
    NotFound { key: String, message: String },

    /// Access denied
    #[error("Access denied to {key}: {message}")]
    AccessDenied { key: String, message: String },

    /// Transient network/service error
    #[error("Transient provider error for {key}: {message}")]
    Transient { key: String, message: String },

    /// Other client error
    #[error("Client error for {key}: {message}")]
    Client { key: String, message: String },
}

impl StoreError {
    /// Build an error of the given kind.
    pub fn new(kind: StoreErrorKind, key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        let message = message.into();
        match kind {
            StoreErrorKind::NotFound => Self::NotFound { key, message },
            StoreErrorKind::AccessDenied => Self::AccessDenied { key, message },
            StoreErrorKind::TransientProvider => Self::Transient { key, message },
            StoreErrorKind::OtherClient => Self::Client { key, message },
        }
    }

    /// The stable discriminant of this error.
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::AccessDenied { .. } => StoreErrorKind::AccessDenied,
            Self::Transient { .. } => StoreErrorKind::TransientProvider,
            Self::Client { .. } => StoreErrorKind::OtherClient,
        }
    }

    /// The key the failed operation targeted.
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key, .. }
            | Self::AccessDenied { key, .. }
            | Self::Transient { key, .. }
            | Self::Client { key, .. } => key,
        }
    }

    /// Retry category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            StoreErrorKind::TransientProvider => ErrorCategory::Transient,
            StoreErrorKind::NotFound
            | StoreErrorKind::AccessDenied
            | StoreErrorKind::OtherClient => ErrorCategory::Permanent,
        }
    }

    /// Check if this error may succeed when re-attempted.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

/// Malformed structured record errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Input is not valid JSON or does not have the envelope shape
    #[error("Invalid record JSON: {0}")]
    Json(String),

    /// A required field is absent or not a string
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// `data.type` names a record type that has no storage category
    #[error("Unknown record type: {0}")]
    UnknownType(String),
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: network timeout, S3 503, throttling
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: key not found, access denied, malformed record
    Permanent,
}

/// Classifies an error to determine retry behavior.
pub fn classify_error(error: &MrError) -> ErrorCategory {
    match error {
        MrError::Store(e) => e.category(),
        MrError::Record(_) => ErrorCategory::Permanent,
        MrError::Config(_) => ErrorCategory::Permanent,
        MrError::Other(_) => ErrorCategory::Transient,
    }
}

/// Result type alias using MrError.
pub type Result<T> = std::result::Result<T, MrError>;
