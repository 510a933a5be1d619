//! Folder markers for prefixes in a flat namespace.

use std::sync::Arc;

use mr_error::StoreError;
use mr_traits::{ObjectStore, PLACEHOLDER_BODY};
use tracing::{debug, info};

use crate::retry::{RetryConfig, with_retry};

/// Key suffix of the placeholder written next to each folder marker.
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// Ensures a folder marker exists for a prefix.
///
/// The check and the writes are not atomic. Two workers racing on the same
/// prefix may both write; the writes target the same keys with the same
/// bodies, so the result is identical either way.
pub struct FolderEnsurer<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    retry: RetryConfig,
}

impl<S: ObjectStore + ?Sized> FolderEnsurer<S> {
    /// Create an ensurer over a shared store.
    pub fn new(store: Arc<S>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Ensure `folder` has a marker.
    ///
    /// If no object exists under `folder`, writes an empty marker at
    /// `folder` and a placeholder at `{folder}placeholder`. Returns whether
    /// anything was written.
    pub async fn ensure(&self, folder: &str) -> Result<bool, StoreError> {
        let folder = folder_prefix(folder);

        let present = with_retry(&self.retry, "folder_check", || {
            self.store.any_with_prefix(&folder)
        })
        .await?;

        if present {
            debug!(folder = %folder, "Folder already present");
            return Ok(false);
        }

        let placeholder = format!("{folder}{PLACEHOLDER_NAME}");
        with_retry(&self.retry, "folder_marker", || self.store.put(&folder, &[])).await?;
        with_retry(&self.retry, "folder_placeholder", || {
            self.store.put(&placeholder, PLACEHOLDER_BODY)
        })
        .await?;

        info!(folder = %folder, "Created folder");
        Ok(true)
    }
}

impl<S: ObjectStore + ?Sized> Clone for FolderEnsurer<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            retry: self.retry.clone(),
        }
    }
}

/// Normalize a folder path to end with exactly one `/`.
fn folder_prefix(folder: &str) -> String {
    if folder.ends_with('/') {
        folder.to_string()
    } else {
        format!("{folder}/")
    }
}
