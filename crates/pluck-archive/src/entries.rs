//! Pull-based iteration over tarball entries
//!
//! [`PackageArchive`] owns the gunzip + tar pipeline; [`ArchiveEntries`] is a
//! lazy, finite, non-restartable sequence over it. Consumers stop pulling as
//! soon as they have what they need, and dropping the archive tears the whole
//! pipeline down.

use std::borrow::Cow;
use std::error::Error;
use std::io::{self, Read};

use flate2::read::GzDecoder;
use pluck_core::error::PluckError;
use pluck_core::utils::path::normalize_entry_path;
use pluck_registry::BodyError;

use crate::ArchiveResult;

/// Kind of a tar entry, as far as the gateway cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// A gzipped package tarball being read front to back
pub struct PackageArchive<R: Read> {
    archive: tar::Archive<GzDecoder<R>>,
}

/// Lazy sequence of entries of a [`PackageArchive`]
pub struct ArchiveEntries<'a, R: 'a + Read> {
    inner: tar::Entries<'a, GzDecoder<R>>,
}

/// One entry, positioned at the start of its data
pub struct ArchiveEntry<'a, R: 'a + Read> {
    /// Path relative to the package root, always starting with `/`
    pub path: String,
    /// Entry kind
    pub kind: EntryKind,
    entry: tar::Entry<'a, GzDecoder<R>>,
}

impl<R: Read> PackageArchive<R> {
    /// Wrap a reader producing gzip-compressed tar bytes
    pub fn new(reader: R) -> Self {
        Self {
            archive: tar::Archive::new(GzDecoder::new(reader)),
        }
    }

    /// Start the single pass over the archive
    pub fn entries(&mut self) -> ArchiveResult<ArchiveEntries<'_, R>> {
        let inner = self
            .archive
            .entries()
            .map_err(|e| classify_io(e, "failed to start reading tarball"))?;
        Ok(ArchiveEntries { inner })
    }
}

impl<'a, R: 'a + Read> Iterator for ArchiveEntries<'a, R> {
    type Item = ArchiveResult<ArchiveEntry<'a, R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(classify_io(e, "failed to read tar entry"))),
        };

        let raw_path = match entry.path_bytes() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Cow::Owned(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        };

        let entry_type = entry.header().entry_type();
        let kind = if entry_type.is_file() {
            EntryKind::File
        } else if entry_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };

        Some(Ok(ArchiveEntry {
            path: normalize_entry_path(&raw_path),
            kind,
            entry,
        }))
    }
}

impl<'a, R: 'a + Read> ArchiveEntry<'a, R> {
    /// Size recorded in the entry header
    pub fn size(&self) -> u64 {
        self.entry.size()
    }

    /// Drain the entry's data into memory
    pub fn read_to_vec(mut self) -> ArchiveResult<Vec<u8>> {
        let capacity = usize::try_from(self.entry.size()).unwrap_or(0);
        let mut buffer = Vec::with_capacity(capacity.min(16 * 1024 * 1024));
        self.entry
            .read_to_end(&mut buffer)
            .map_err(|e| classify_io(e, format!("failed to read {}", self.path)))?;
        Ok(buffer)
    }
}

/// Whether an I/O error originated in the HTTP body rather than in gunzip/tar
fn is_transport_failure(err: &io::Error) -> bool {
    let mut current = err.get_ref().map(|inner| inner as &(dyn Error + 'static));
    while let Some(error) = current {
        if error.is::<BodyError>() {
            return true;
        }
        current = error.source();
    }
    false
}

/// Map an I/O error from the pipeline onto the gateway's error kinds
pub(crate) fn classify_io(err: io::Error, context: impl Into<String>) -> PluckError {
    if is_transport_failure(&err) {
        PluckError::upstream(context, err)
    } else {
        PluckError::corrupt(context, err)
    }
}
