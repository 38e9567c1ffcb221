//! Error types and result aliases for pluck operations.
//!
//! Every failure is raised as a tagged variant at the point where it happens
//! and carried unchanged to the dispatcher, which is the only place that turns
//! an [`ErrorKind`] into an HTTP status.

use thiserror::Error;

/// Boxed error source attached to upstream and archive failures
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for all pluck operations
#[derive(Error, Debug)]
pub enum PluckError {
    // Upstream errors
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Malformed registry data for '{package}': {reason}")]
    MalformedRegistryData { package: String, reason: String },

    // Resolution errors
    #[error("No version of '{package}' matches '{specifier}'")]
    VersionNotFound { package: String, specifier: String },

    #[error("No entry point declared by {package}@{version}")]
    EntryPointNotFound { package: String, version: String },

    // Archive errors
    #[error("File not found in archive: {path}")]
    ArchiveEntryNotFound { path: String },

    #[error("Corrupt archive: {message}")]
    ArchiveCorrupt {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    // Request errors
    #[error("Invalid request path: {path}")]
    InvalidRequestPath { path: String },

    // Config errors
    #[error("Configuration field '{field}' is invalid: {reason}")]
    Config { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

/// Coarse failure class used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Registry or tarball origin unreachable, timed out or non-success (504)
    UpstreamUnavailable,
    /// Version, entry point, archive entry or request path missing (404)
    NotFound,
    /// Anything else (500)
    Internal,
}

/// Result type alias for pluck operations
pub type PluckResult<T> = Result<T, PluckError>;

impl PluckError {
    /// Create an upstream error from any error type
    pub fn upstream<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UpstreamUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an upstream error for a non-success HTTP status
    pub fn upstream_status(url: &str, status: u16) -> Self {
        Self::UpstreamUnavailable {
            message: format!("{} returned status {}", url, status),
            source: None,
        }
    }

    /// Create an archive corruption error from any error type
    pub fn corrupt<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ArchiveCorrupt {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Classify this error for status mapping
    pub fn kind(&self) -> ErrorKind {
        match self {
            PluckError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            PluckError::VersionNotFound { .. }
            | PluckError::EntryPointNotFound { .. }
            | PluckError::ArchiveEntryNotFound { .. }
            | PluckError::InvalidRequestPath { .. } => ErrorKind::NotFound,
            PluckError::MalformedRegistryData { .. }
            | PluckError::ArchiveCorrupt { .. }
            | PluckError::Config { .. }
            | PluckError::Io { .. }
            | PluckError::Unexpected { .. } => ErrorKind::Internal,
        }
    }

    /// Short name of the failure class, shown in response bodies
    pub fn class_name(&self) -> &'static str {
        match self {
            PluckError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            PluckError::MalformedRegistryData { .. } => "MalformedRegistryData",
            PluckError::VersionNotFound { .. } => "VersionNotFound",
            PluckError::EntryPointNotFound { .. } => "EntryPointNotFound",
            PluckError::ArchiveEntryNotFound { .. } => "ArchiveEntryNotFound",
            PluckError::ArchiveCorrupt { .. } => "ArchiveCorrupt",
            PluckError::InvalidRequestPath { .. } => "InvalidRequestPath",
            PluckError::Config { .. } => "Config",
            PluckError::Io { .. } => "Io",
            PluckError::Unexpected { .. } => "Unexpected",
        }
    }
}
