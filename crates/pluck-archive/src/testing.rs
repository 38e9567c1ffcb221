//! In-memory tarball builder for tests

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

/// One entry to place in a test tarball
pub struct TestEntry<'a> {
    pub path: &'a str,
    pub kind: EntryType,
    pub data: &'a [u8],
}

impl<'a> TestEntry<'a> {
    pub fn file(path: &'a str, data: &'a [u8]) -> Self {
        Self {
            path,
            kind: EntryType::Regular,
            data,
        }
    }

    pub fn dir(path: &'a str) -> Self {
        Self {
            path,
            kind: EntryType::Directory,
            data: b"",
        }
    }

    pub fn symlink(path: &'a str) -> Self {
        Self {
            path,
            kind: EntryType::Symlink,
            data: b"",
        }
    }
}

/// Build a gzipped tarball holding `entries` in order
pub fn tarball(entries: &[TestEntry<'_>]) -> Vec<u8> {
    let mut tarball_data = Vec::new();
    {
        let gz_encoder = GzEncoder::new(&mut tarball_data, Compression::default());
        let mut tar_builder = Builder::new(gz_encoder);

        for entry in entries {
            let mut header = Header::new_gnu();
            header.set_path(entry.path).unwrap();
            header.set_entry_type(entry.kind);
            header.set_size(entry.data.len() as u64);
            header.set_mode(if entry.kind == EntryType::Directory { 0o755 } else { 0o644 });
            if entry.kind == EntryType::Symlink {
                header.set_link_name("index.js").unwrap();
            }
            header.set_cksum();
            tar_builder.append(&header, entry.data).unwrap();
        }

        tar_builder.into_inner().unwrap().finish().unwrap();
    }
    tarball_data
}
