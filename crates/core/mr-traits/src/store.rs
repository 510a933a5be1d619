//! Object store capability trait and listing types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mr_error::StoreError;

/// Body written to folder placeholder objects.
pub const PLACEHOLDER_BODY: &[u8] = b"This is a placeholder file.";

/// Trait for object store backends.
///
/// Implementations include:
/// - S3 (production, `mr-mover`)
/// - In-memory store (testing, `mr-memstore`)
///
/// A single instance is shared by reference across all workers; every
/// method must be safe to call concurrently. All keys live in one namespace
/// (one bucket).
///
/// Errors are returned as [`StoreError`] values already mapped to a
/// [`StoreErrorKind`](mr_error::StoreErrorKind).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of objects under `prefix`.
    ///
    /// Pass the previous page's [`ListPage::next_token`] to continue.
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Copies the object at `source_key` to `dest_key` in the same namespace.
    async fn copy(&self, source_key: &str, dest_key: &str) -> Result<(), StoreError>;

    /// Deletes `key`.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Writes `body` to `key`, replacing any existing object.
    async fn put(&self, key: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Checks whether an object exists at exactly `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let page = self.list_page(key, None).await?;
        Ok(page.objects.iter().any(|obj| obj.key == key))
    }

    /// Checks whether any object exists with `prefix`.
    async fn any_with_prefix(&self, prefix: &str) -> Result<bool, StoreError> {
        let page = self.list_page(prefix, None).await?;
        Ok(!page.objects.is_empty())
    }
}

/// An object discovered during listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    pub size: u64,

    /// Last modified timestamp
    pub last_modified: Option<DateTime<Utc>>,
}

impl StoredObject {
    /// Create an object entry with no timestamp.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects on this page, in key order
    pub objects: Vec<StoredObject>,

    /// Token for the next page; `None` on the last page
    pub next_token: Option<String>,
}

impl ListPage {
    /// Whether more pages follow.
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}
