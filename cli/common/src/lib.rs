//! Shared utilities for the reorganizer CLI binaries.

pub mod args;
pub mod format;
pub mod logging;

pub use args::{LogLevel, parse_positive_usize};
pub use format::{format_duration, format_number};
pub use logging::init_logging;
