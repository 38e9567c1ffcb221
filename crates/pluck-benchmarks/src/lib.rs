//! pluck benchmarking suite
//!
//! Benchmarks for the per-request hot paths: content sniffing, version
//! range selection and single-pass archive extraction.

pub mod common;

pub use common::*;
