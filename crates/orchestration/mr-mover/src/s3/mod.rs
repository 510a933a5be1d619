//! S3 backend for the [`ObjectStore`](mr_traits::ObjectStore) capability.
//!
//! - Client configuration with LocalStack support
//! - [`S3ObjectStore`] mapping SDK errors onto [`StoreErrorKind`](mr_error::StoreErrorKind)

mod client;
mod store;

pub use client::{S3Config, create_s3_client};
pub use store::S3ObjectStore;
