//! npm registry client for the pluck gateway
//!
//! This crate provides the HTTP side of the gateway: fetching package
//! metadata and version manifests from the registry, and opening tarball
//! bodies as byte streams. Every call is a single attempt bounded by the
//! configured timeout.

pub mod api;
pub mod client;

// Re-export main types
pub use api::PackageMetadataResponse;
pub use client::{BodyError, RegistryClient, RegistryConfig, TarballStream};

use pluck_core::error::PluckError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, PluckError>;
