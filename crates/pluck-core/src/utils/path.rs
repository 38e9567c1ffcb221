//! Path utilities for in-archive paths.
//!
//! Archive entries and requested sub-paths are compared as plain strings
//! rooted at the package's top level, always starting with `/`.

/// Drop any number of leading `./` segments
fn strip_current_dir(mut path: &str) -> &str {
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

/// Make a manifest path comparable to normalized entry paths.
///
/// `./index.js`, `index.js` and `/index.js` all become `/index.js`.
pub fn ensure_leading_slash(path: &str) -> String {
    let path = strip_current_dir(path);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Normalize a raw tar entry path.
///
/// Package archives nest every entry under one synthetic directory
/// (`package/` for npm); that first component is dropped. Entries with no
/// directory component are kept as they are.
pub fn normalize_entry_path(raw: &str) -> String {
    let raw = strip_current_dir(raw.trim_start_matches('/'));
    match raw.split_once('/') {
        Some((_top, rest)) => format!("/{}", rest),
        None => format!("/{}", raw),
    }
}

/// A direct child of the package root: `/name` with no further separator
pub fn is_top_level(path: &str) -> bool {
    match path.strip_prefix('/') {
        Some(name) => !name.is_empty() && !name.contains('/'),
        None => false,
    }
}
