//! Transient per-object relocation state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single object relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    /// Dispatched, nothing attempted yet
    Pending,

    /// Destination holds a copy; source not yet deleted
    Copied,

    /// Copy succeeded and source was deleted
    Deleted,

    /// Copy failed; source untouched, destination absent
    FailedCopy,

    /// Copy succeeded but delete failed; both keys hold the object
    FailedDelete,
}

impl MoveStatus {
    /// Whether the relocation is finished (successfully or not).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MoveStatus::Deleted | MoveStatus::FailedCopy | MoveStatus::FailedDelete
        )
    }

    /// Whether the relocation ended in a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, MoveStatus::FailedCopy | MoveStatus::FailedDelete)
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveStatus::Pending => "pending",
            MoveStatus::Copied => "copied",
            MoveStatus::Deleted => "deleted",
            MoveStatus::FailedCopy => "failed_copy",
            MoveStatus::FailedDelete => "failed_delete",
        }
    }
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dispatched relocation: where from, where to, and how far it got.
///
/// Created per dispatched object and discarded after logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Key the object currently lives at
    pub source_key: String,

    /// Key the object is being moved to
    pub dest_key: String,

    /// Current status
    pub status: MoveStatus,
}

impl MoveRecord {
    /// Create a pending move record.
    pub fn new(source_key: impl Into<String>, dest_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            dest_key: dest_key.into(),
            status: MoveStatus::Pending,
        }
    }

    /// Advance to a new status.
    pub fn advance(&mut self, status: MoveStatus) {
        self.status = status;
    }
}
