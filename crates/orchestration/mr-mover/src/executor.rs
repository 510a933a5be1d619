//! Single-object relocation: copy, optionally verify, then delete.

use std::sync::Arc;

use mr_error::{StoreError, StoreErrorKind};
use mr_traits::ObjectStore;
use mr_types::{MoveRecord, MoveStatus};
use tracing::{info, warn};

use crate::retry::{RetryConfig, with_retry};

/// Result of one relocation attempt.
///
/// Failures are values, not errors: a `failed_copy` or `failed_delete`
/// outcome carries the classified [`StoreError`] that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Source, destination and final status
    pub record: MoveRecord,

    /// The error behind a failed status
    pub error: Option<StoreError>,
}

impl MoveOutcome {
    /// Final status of the relocation.
    pub fn status(&self) -> MoveStatus {
        self.record.status
    }

    /// Whether the object now lives only at the destination.
    pub fn is_success(&self) -> bool {
        self.record.status == MoveStatus::Deleted
    }

    fn failed(mut record: MoveRecord, status: MoveStatus, error: StoreError) -> Self {
        record.advance(status);
        Self {
            record,
            error: Some(error),
        }
    }
}

/// Moves objects within one store namespace.
///
/// The delete is only issued after the copy (and verification, when
/// enabled) succeeded, so at every instant the object exists at the
/// source, the destination, or both.
pub struct MoveExecutor<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    retry: RetryConfig,
    verify_copy: bool,
}

impl<S: ObjectStore + ?Sized> MoveExecutor<S> {
    /// Create an executor over a shared store.
    pub fn new(store: Arc<S>, retry: RetryConfig) -> Self {
        Self {
            store,
            retry,
            verify_copy: false,
        }
    }

    /// Check the destination exists before deleting the source.
    pub fn with_verify_copy(mut self, verify: bool) -> Self {
        self.verify_copy = verify;
        self
    }

    /// Relocate `source_key` to `dest_key`.
    pub async fn move_object(&self, source_key: &str, dest_key: &str) -> MoveOutcome {
        let mut record = MoveRecord::new(source_key, dest_key);

        if let Err(e) = with_retry(&self.retry, "copy", || self.store.copy(source_key, dest_key)).await
        {
            warn!(
                source = %source_key,
                dest = %dest_key,
                kind = %e.kind(),
                error = %e,
                "Copy failed, source left in place"
            );
            return MoveOutcome::failed(record, MoveStatus::FailedCopy, e);
        }
        record.advance(MoveStatus::Copied);
        info!(source = %source_key, dest = %dest_key, "Moved");

        if self.verify_copy {
            if let Err(e) = self.verify(dest_key).await {
                warn!(
                    source = %source_key,
                    dest = %dest_key,
                    error = %e,
                    "Copy verification failed, source left in place"
                );
                return MoveOutcome::failed(record, MoveStatus::FailedCopy, e);
            }
        }

        if let Err(e) = with_retry(&self.retry, "delete", || self.store.delete(source_key)).await {
            warn!(
                source = %source_key,
                dest = %dest_key,
                kind = %e.kind(),
                error = %e,
                "Delete failed, object present at both keys"
            );
            return MoveOutcome::failed(record, MoveStatus::FailedDelete, e);
        }
        record.advance(MoveStatus::Deleted);
        info!(key = %source_key, "Deleted");

        MoveOutcome {
            record,
            error: None,
        }
    }

    async fn verify(&self, dest_key: &str) -> Result<(), StoreError> {
        let present = with_retry(&self.retry, "verify", || self.store.exists(dest_key)).await?;
        if present {
            Ok(())
        } else {
            Err(StoreError::new(
                StoreErrorKind::NotFound,
                dest_key,
                "destination absent after copy",
            ))
        }
    }
}
