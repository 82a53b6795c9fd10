//! Utility functions for string formatting.

pub mod format;

pub use format::{compact_count, truncate_string};
