//! Media-type detection from file content
//!
//! Detection looks at bytes only, never at the file name. Rules are checked in
//! a fixed order and the first match wins: magic numbers, then text patterns
//! over the head of the file, then a printable-text check.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::charset::guess_charset;

/// Below this many bytes nothing is guessed
const MIN_SNIFF_LEN: usize = 4;
/// Bytes of the head decoded for text patterns
const TEXT_HEAD_LEN: usize = 256;
/// Bytes scanned for control characters
const PRINTABLE_SCAN_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";

static HTML_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<html\b|<!doctype\s+html>|<head>|<body>|<title>").expect("valid html pattern")
});
static XML_NAMESPACED_ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[a-z]+:?[a-z]+\s+xmlns=").expect("valid xml pattern"));
static JAVASCRIPT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:import\s|export\s|function\s|class\s|var\s|let\s|const\s|/\*\*|//)")
        .expect("valid javascript pattern")
});
static CSS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*@import\s+url|^\s*/\*|^\s*body\s*\{").expect("valid css pattern")
});
static SVG_ROOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<svg\s+xmlns=").expect("valid svg pattern"));
static MARKDOWN_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s+[[:word:]]+|^\*\*[[:word:]]+\*\*").expect("valid markdown pattern")
});

/// Leading byte signatures, checked in order
const MAGIC_NUMBERS: &[(&[u8], &str)] = &[
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (&[0x89, 0x50, 0x4E, 0x47], "image/png"),
    (b"GIF8", "image/gif"),
    (b"%PDF", "application/pdf"),
    (&[0x50, 0x4B, 0x03, 0x04], "application/zip"),
    (&[0x1F, 0x8B, 0x08], "application/gzip"),
    (b"Rar!", "application/x-rar-compressed"),
];

/// Media type and charset guessed for a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffResult {
    pub mime_type: &'static str,
    pub charset: String,
}

impl SniffResult {
    /// Value for the `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", self.mime_type, self.charset)
    }
}

/// Guess media type and charset of a file
pub fn sniff(buf: &[u8]) -> SniffResult {
    SniffResult {
        mime_type: sniff_mime(buf),
        charset: guess_charset(buf),
    }
}

/// Guess the media type of a file from its bytes
pub fn sniff_mime(buf: &[u8]) -> &'static str {
    if buf.len() < MIN_SNIFF_LEN {
        return OCTET_STREAM;
    }

    if let Some(mime) = match_magic(buf) {
        return mime;
    }

    let head = &buf[..buf.len().min(TEXT_HEAD_LEN)];
    let head_text = String::from_utf8_lossy(head).to_lowercase();

    if let Some(mime) = match_text(&head_text, buf) {
        return mime;
    }

    if is_printable(buf) {
        "text/plain"
    } else {
        OCTET_STREAM
    }
}

fn match_magic(buf: &[u8]) -> Option<&'static str> {
    for &(signature, mime) in MAGIC_NUMBERS {
        if buf.starts_with(signature) {
            return Some(mime);
        }
    }

    if buf.starts_with(b"RIFF") && buf.get(8..12) == Some(b"WEBP".as_slice()) {
        return Some("image/webp");
    }

    None
}

fn match_text(head_text: &str, buf: &[u8]) -> Option<&'static str> {
    if HTML_MARKERS.is_match(head_text) {
        return Some("text/html");
    }

    if head_text.starts_with("<?xml ") || XML_NAMESPACED_ROOT.is_match(head_text) {
        return Some("application/xml");
    }

    // JSON needs the whole buffer to parse, not just the head
    let trimmed = head_text.trim();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_slice::<serde_json::Value>(buf).is_ok()
    {
        return Some("application/json");
    }

    if JAVASCRIPT_PREFIX.is_match(head_text) {
        return Some("application/javascript");
    }

    if CSS_PREFIX.is_match(head_text) {
        return Some("text/css");
    }

    if SVG_ROOT.is_match(head_text) {
        return Some("image/svg+xml");
    }

    if MARKDOWN_PREFIX.is_match(head_text) {
        return Some("text/markdown");
    }

    None
}

/// No control bytes other than tab, LF and CR in the first 512 bytes
fn is_printable(buf: &[u8]) -> bool {
    buf.iter()
        .take(PRINTABLE_SCAN_LEN)
        .all(|&byte| byte >= 0x20 || matches!(byte, b'\t' | b'\n' | b'\r'))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sniffing_is_idempotent(buf in prop::collection::vec(any::<u8>(), 0..1024)) {
            prop_assert_eq!(sniff(&buf), sniff(&buf));
        }

        #[test]
        fn printable_text_is_never_octet_stream(text in "[ -~\t\r\n]{4,600}") {
            prop_assert_ne!(sniff_mime(text.as_bytes()), OCTET_STREAM);
        }

        #[test]
        fn short_buffers_are_octet_stream(buf in prop::collection::vec(any::<u8>(), 0..4)) {
            prop_assert_eq!(sniff_mime(&buf), OCTET_STREAM);
        }
    }
}
