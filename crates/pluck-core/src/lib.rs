//! # pluck-core
//!
//! Core types and utilities shared across all pluck crates.
//!
//! This crate provides:
//! - Version and VersionReq types implementing npm-flavoured semver ranges
//! - PackageRequest parsing for incoming gateway paths
//! - VersionManifest and default entry point selection
//! - PluckError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, VersionReq, PackageRequest, VersionManifest)
//! - `error`: Error types and result aliases
//! - `utils`: Path normalization helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorKind, PluckError, PluckResult};
pub use types::{PackageRequest, RequestMode, Version, VersionManifest, VersionReq};
