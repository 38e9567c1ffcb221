//! # pluck-content
//!
//! Response body helpers for the pluck gateway:
//! - `sniff`: media-type detection from file bytes
//! - `charset`: character encoding guess for served files
//! - `listing`: HTML rendering of a package's top-level files

pub mod charset;
pub mod listing;
pub mod sniff;

pub use charset::guess_charset;
pub use listing::render;
pub use sniff::{sniff, sniff_mime, SniffResult};
