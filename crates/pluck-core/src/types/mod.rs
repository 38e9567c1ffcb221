//! Core data types for the pluck gateway.
//!
//! This module provides the fundamental types used throughout pluck:
//! - Version and range types for npm-style semantic versioning
//! - The parsed gateway request
//! - The per-version package manifest

pub mod manifest;
pub mod range;
pub mod request;
pub mod version;

// Re-export all public types
pub use manifest::{resolve_entry_point, DistInfo, VersionManifest};
pub use range::{Comparator, Op, VersionReq};
pub use request::{PackageRequest, RequestMode, DEFAULT_SPECIFIER};
pub use version::{Version, VersionError};
