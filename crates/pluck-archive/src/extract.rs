//! Single-pass tarball queries
//!
//! Both functions read the archive front to back and stop as early as they
//! can; neither ever materializes more than one entry's data.

use std::io::Read;

use pluck_core::error::PluckError;
use pluck_core::utils::path::is_top_level;
use tracing::debug;

use crate::entries::{EntryKind, PackageArchive};
use crate::ArchiveResult;

/// Extract the first regular file whose normalized path equals `target`
///
/// `target` must already be in normalized form (`/lib/index.js`). Reading
/// stops at the first match, so a duplicate later in the archive is ignored.
pub fn extract_file<R: Read>(reader: R, target: &str) -> ArchiveResult<Vec<u8>> {
    let mut archive = PackageArchive::new(reader);

    for entry in archive.entries()? {
        let entry = entry?;
        if entry.kind != EntryKind::File || entry.path != target {
            continue;
        }

        debug!("Found {} ({} bytes)", entry.path, entry.size());
        return entry.read_to_vec();
    }

    Err(PluckError::ArchiveEntryNotFound {
        path: target.to_string(),
    })
}

/// List the regular files sitting directly in the package root, in archive order
pub fn list_top_level<R: Read>(reader: R) -> ArchiveResult<Vec<String>> {
    let mut archive = PackageArchive::new(reader);
    let mut paths = Vec::new();

    for entry in archive.entries()? {
        let entry = entry?;
        if entry.kind == EntryKind::File && is_top_level(&entry.path) {
            paths.push(entry.path);
        }
    }

    debug!("Listed {} top-level files", paths.len());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tarball, TestEntry};
    use std::io::Cursor;

    fn left_pad() -> Vec<u8> {
        tarball(&[
            TestEntry::file("package/package.json", br#"{"name":"left-pad"}"#),
            TestEntry::file("package/index.js", b"module.exports = leftPad;"),
            TestEntry::dir("package/lib/"),
            TestEntry::file("package/lib/util.js", b"exports.x = 1;"),
            TestEntry::file("package/README.md", b"# left-pad"),
        ])
    }

    #[test]
    fn test_extract_file() {
        let content = extract_file(Cursor::new(left_pad()), "/index.js").unwrap();
        assert_eq!(content, b"module.exports = leftPad;");
    }

    #[test]
    fn test_extract_nested_file() {
        let content = extract_file(Cursor::new(left_pad()), "/lib/util.js").unwrap();
        assert_eq!(content, b"exports.x = 1;");
    }

    #[test]
    fn test_extract_missing_file() {
        match extract_file(Cursor::new(left_pad()), "/nope.js").unwrap_err() {
            PluckError::ArchiveEntryNotFound { path } => assert_eq!(path, "/nope.js"),
            other => panic!("Expected ArchiveEntryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_ignores_non_files() {
        let data = tarball(&[
            TestEntry::symlink("package/main.js"),
            TestEntry::file("package/other.js", b"x"),
        ]);
        assert!(matches!(
            extract_file(Cursor::new(data), "/main.js"),
            Err(PluckError::ArchiveEntryNotFound { .. })
        ));
    }

    #[test]
    fn test_extract_first_match_wins() {
        let data = tarball(&[
            TestEntry::file("package/a.js", b"first"),
            TestEntry::file("package/a.js", b"second"),
        ]);
        assert_eq!(extract_file(Cursor::new(data), "/a.js").unwrap(), b"first");
    }

    #[test]
    fn test_extract_from_non_package_root() {
        // Some packages ship with a root directory other than `package/`
        let data = tarball(&[TestEntry::file("node-fetch/index.js", b"ok")]);
        assert_eq!(extract_file(Cursor::new(data), "/index.js").unwrap(), b"ok");
    }

    #[test]
    fn test_truncated_archive_is_corrupt() {
        let mut data = left_pad();
        data.truncate(data.len() / 2);
        let result = list_top_level(Cursor::new(data));
        assert!(matches!(result, Err(PluckError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_list_top_level() {
        let listed = list_top_level(Cursor::new(left_pad())).unwrap();
        assert_eq!(listed, vec!["/package.json", "/index.js", "/README.md"]);
    }

    #[test]
    fn test_list_excludes_symlinks_and_dirs() {
        let data = tarball(&[
            TestEntry::dir("package/dist/"),
            TestEntry::symlink("package/link.js"),
            TestEntry::file("package/dist/bundle.js", b"x"),
        ]);
        assert!(list_top_level(Cursor::new(data)).unwrap().is_empty());
    }

    #[test]
    fn test_list_not_gzip() {
        assert!(matches!(
            list_top_level(Cursor::new(b"plain text".to_vec())),
            Err(PluckError::ArchiveCorrupt { .. })
        ));
    }
}
