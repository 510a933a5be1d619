//! Batch statistics for a migration run.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use mr_types::MoveStatus;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::executor::MoveOutcome;

/// Maximum number of error messages kept for the report.
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Statistics collected during a migration run.
///
/// Shared by all workers; counters are updated with relaxed atomics.
#[derive(Debug, Default)]
pub struct MigrationStats {
    started_at: Mutex<Option<DateTime<Utc>>>,
    completed_at: Mutex<Option<DateTime<Utc>>>,

    discovered: AtomicU64,
    skipped: AtomicU64,
    dispatched: AtomicU64,
    resolved: AtomicU64,
    errored: AtomicU64,

    moved: AtomicU64,
    failed_copy: AtomicU64,
    failed_delete: AtomicU64,
    planned: AtomicU64,

    pages: AtomicU64,
    listing_failed: AtomicU64,

    errors: Mutex<Vec<String>>,
}

impl MigrationStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Mutex::new(Some(Utc::now())),
            ..Default::default()
        }
    }

    /// Mark the run as complete with the current time.
    pub fn complete(&self) {
        *self.completed_at.lock() = Some(Utc::now());
    }

    /// Record a listed object.
    pub fn record_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an object already under a canonical root.
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an object handed to the worker pool.
    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed relocation, whatever its status.
    pub fn record_outcome(&self, outcome: &MoveOutcome) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        match outcome.status() {
            MoveStatus::Deleted => {
                self.moved.fetch_add(1, Ordering::Relaxed);
            }
            MoveStatus::FailedCopy => {
                self.failed_copy.fetch_add(1, Ordering::Relaxed);
            }
            MoveStatus::FailedDelete => {
                self.failed_delete.fetch_add(1, Ordering::Relaxed);
            }
            MoveStatus::Pending | MoveStatus::Copied => {}
        }
        if let Some(error) = &outcome.error {
            self.record_error(format!(
                "{} {}: {error}",
                outcome.status(),
                outcome.record.source_key
            ));
        }
    }

    /// Record a dry-run object that was resolved but not moved.
    pub fn record_planned(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        self.planned.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an object whose processing raised instead of completing.
    pub fn record_errored(&self, key: &str, error: impl std::fmt::Display) {
        self.errored.fetch_add(1, Ordering::Relaxed);
        self.record_error(format!("errored {key}: {error}"));
    }

    /// Record a listed page.
    pub fn record_page(&self) {
        self.pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Record that listing stopped before the last page.
    pub fn record_listing_failure(&self, error: impl std::fmt::Display) {
        self.listing_failed.fetch_add(1, Ordering::Relaxed);
        self.record_error(format!("listing: {error}"));
    }

    /// Record an error message for the report.
    pub fn record_error(&self, error: impl ToString) {
        let mut errors = self.errors.lock();
        if errors.len() < MAX_RECORDED_ERRORS {
            errors.push(error.to_string());
        }
    }

    /// Number of objects listed so far.
    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Relaxed)
    }

    /// Number of objects resolved so far.
    pub fn resolved(&self) -> u64 {
        self.resolved.load(Ordering::Relaxed)
    }

    /// Number of objects errored so far.
    pub fn errored(&self) -> u64 {
        self.errored.load(Ordering::Relaxed)
    }

    /// Create a snapshot of the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: *self.started_at.lock(),
            completed_at: *self.completed_at.lock(),
            discovered: self.discovered(),
            skipped: self.skipped.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            resolved: self.resolved(),
            errored: self.errored(),
            moved: self.moved.load(Ordering::Relaxed),
            failed_copy: self.failed_copy.load(Ordering::Relaxed),
            failed_delete: self.failed_delete.load(Ordering::Relaxed),
            planned: self.planned.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            listing_complete: self.listing_failed.load(Ordering::Relaxed) == 0,
            errors: self.errors.lock().clone(),
        }
    }
}

/// A serializable snapshot of migration statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Objects returned by listing
    pub discovered: u64,
    /// Objects already under a canonical root
    pub skipped: u64,
    /// Objects handed to the worker pool
    pub dispatched: u64,
    /// Objects whose move completed, whatever the outcome
    pub resolved: u64,
    /// Objects whose processing raised
    pub errored: u64,
    /// Copied then deleted
    pub moved: u64,
    pub failed_copy: u64,
    pub failed_delete: u64,
    /// Resolved without moving (dry run)
    pub planned: u64,
    /// Listing pages fetched
    pub pages: u64,
    /// Whether listing reached the last page
    pub listing_complete: bool,
    /// First error messages, capped at [`MAX_RECORDED_ERRORS`]
    pub errors: Vec<String>,
}

impl StatsSnapshot {
    /// Get the duration of the run.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Resolved objects per second over the whole run.
    pub fn objects_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.resolved as f64 / secs
            } else {
                0.0
            }
        })
    }

    /// Whether any object failed or errored, or listing stopped early.
    pub fn has_failures(&self) -> bool {
        self.failed_copy > 0 || self.failed_delete > 0 || self.errored > 0 || !self.listing_complete
    }
}
