//! Configuration loading for the pluck gateway
//!
//! This crate handles parsing and validation of pluck.toml files and layers
//! them with environment and command line overrides into one immutable
//! configuration read at process start.

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource};
pub use toml::{PluckToml, RegistrySection, ServerSection};

use pluck_core::error::PluckError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PluckError>;
