//! Core types for the object store reorganizer.
//!
//! This crate provides the foundational types used throughout the system:
//! - [`CanonicalRoot`] - The two top-level namespaces objects are organized into
//! - [`ParsedKey`] / [`KeyClass`] - Typed view of a flat object key
//! - [`Record`] - Structured docket/document/comment record
//! - [`DestinationPath`] / [`RecordPaths`] - Canonical storage paths
//! - [`MoveRecord`] - Transient per-object relocation state

pub mod key;
pub mod move_record;
pub mod path;
pub mod record;
pub mod root;

pub use key::*;
pub use move_record::*;
pub use path::*;
pub use record::*;
pub use root::*;
