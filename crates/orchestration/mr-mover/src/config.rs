//! Configuration for a migration run.

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 32;

/// Configuration for a [`BatchOrchestrator`](crate::BatchOrchestrator) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Number of concurrent workers; bounds simultaneous store requests
    pub workers: usize,

    /// Capacity of the shared queue between listing and workers
    pub channel_buffer: usize,

    /// Only objects under this prefix are listed
    pub prefix: String,

    /// Write `raw-data/` and `derived-data/` markers before listing
    pub ensure_root_folders: bool,

    /// Write a marker for each destination's parent prefix before moving
    pub ensure_parent_folders: bool,

    /// Check the destination exists before deleting the source
    pub verify_copy: bool,

    /// Resolve and log moves without touching the store
    pub dry_run: bool,

    /// Retry policy for every store call
    pub retry: RetryConfig,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            channel_buffer: 100,
            prefix: String::new(),
            ensure_root_folders: true,
            ensure_parent_folders: false,
            verify_copy: false,
            dry_run: false,
            retry: RetryConfig::default(),
        }
    }
}

impl MigrationConfig {
    /// Create a new migration configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the channel buffer size.
    pub fn with_channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size;
        self
    }

    /// Restrict listing to a prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable or disable root folder markers.
    pub fn with_ensure_root_folders(mut self, enabled: bool) -> Self {
        self.ensure_root_folders = enabled;
        self
    }

    /// Enable or disable per-destination parent folder markers.
    pub fn with_ensure_parent_folders(mut self, enabled: bool) -> Self {
        self.ensure_parent_folders = enabled;
        self
    }

    /// Enable or disable copy verification.
    pub fn with_verify_copy(mut self, enabled: bool) -> Self {
        self.verify_copy = enabled;
        self
    }

    /// Enable or disable dry run.
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be at least 1".to_string());
        }
        if self.channel_buffer == 0 {
            return Err("channel_buffer must be at least 1".to_string());
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err("initial_backoff_ms must not exceed max_backoff_ms".to_string());
        }
        Ok(())
    }
}
