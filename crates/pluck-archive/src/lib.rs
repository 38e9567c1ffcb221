//! Streaming package tarball extraction
//!
//! This crate reads gzipped package tarballs in a single forward pass,
//! either pulling out one named file or listing the package's top-level
//! files. The archive is never buffered as a whole.

pub mod entries;
pub mod extract;
pub mod fetch;

// Re-export main types
pub use entries::{ArchiveEntries, ArchiveEntry, EntryKind, PackageArchive};
pub use extract::{extract_file, list_top_level};
pub use fetch::TarballExtractor;

use pluck_core::error::PluckError;

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, PluckError>;

#[cfg(test)]
pub(crate) mod testing;
