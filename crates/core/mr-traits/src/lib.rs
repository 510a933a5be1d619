//! Core traits for the object store reorganizer.
//!
//! This crate defines the capability the migration core consumes:
//! - [`ObjectStore`] - list/copy/delete/put against a single namespace

pub mod store;

pub use store::*;
