//! mr-mover - object relocation for the canonical bucket layout.
//!
//! This crate moves objects from a flat `{agency}/{docketId}/...` layout
//! into the `raw-data/` / `derived-data/` hierarchy. It provides:
//!
//! - S3 client configuration and an S3-backed [`ObjectStore`](mr_traits::ObjectStore)
//! - Paginated listing with bounded retry on transient errors
//! - Idempotent folder markers ([`FolderEnsurer`])
//! - Copy-then-delete relocation of a single object ([`MoveExecutor`])
//! - A bounded worker pool over the whole population ([`BatchOrchestrator`])
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mr_mover::{BatchOrchestrator, MigrationConfig, S3Config, S3ObjectStore};
//!
//! let s3_config = S3Config::new("mirrulations").with_endpoint("http://localhost:4566");
//! let store = S3ObjectStore::from_config(&s3_config).await?;
//!
//! let config = MigrationConfig::new().with_workers(32);
//! let stats = BatchOrchestrator::new(config, Arc::new(store)).run().await?;
//! eprintln!("Moved {} objects", stats.moved);
//! ```

pub mod config;
pub mod executor;
pub mod folder;
pub mod listing;
pub mod orchestrator;
pub mod retry;
pub mod router;
pub mod s3;
pub mod stats;

pub use config::{DEFAULT_WORKERS, MigrationConfig};
pub use executor::{MoveExecutor, MoveOutcome};
pub use folder::{FolderEnsurer, PLACEHOLDER_NAME};
pub use listing::list_pages;
pub use orchestrator::BatchOrchestrator;
pub use retry::{RetryConfig, with_retry};
pub use router::{WorkReceiver, WorkRouter};
pub use s3::{S3Config, S3ObjectStore, create_s3_client};
pub use stats::{MigrationStats, StatsSnapshot};
