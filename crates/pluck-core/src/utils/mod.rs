//! Utility functions and helpers.
//!
//! Common functionality used across multiple pluck crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{ensure_leading_slash, is_top_level, normalize_entry_path};
