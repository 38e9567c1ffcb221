//! Common utilities and fixtures for benchmarks

use std::io::Write;

use criterion::Criterion;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Criterion settings shared by every benchmark
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
}

/// Published-looking version keys: `count` versions spread over a few majors
pub fn version_list(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let major = i / 100;
            let minor = (i / 10) % 10;
            let patch = i % 10;
            if i % 17 == 0 {
                format!("{}.{}.{}-beta.{}", major, minor, patch, i % 3)
            } else {
                format!("{}.{}.{}", major, minor, patch)
            }
        })
        .collect()
}

/// Gzipped package tarball with `file_count` files of `file_size` bytes each,
/// half of them nested one directory deep; `package/target.js` comes last
pub fn package_tarball(file_count: usize, file_size: usize) -> Vec<u8> {
    let mut tarball_data = Vec::new();
    {
        let gz_encoder = GzEncoder::new(&mut tarball_data, Compression::default());
        let mut tar_builder = tar::Builder::new(gz_encoder);
        let filler: Vec<u8> = (0..file_size).map(|i| b'a' + (i % 26) as u8).collect();

        let mut append = |path: String, data: &[u8]| {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).expect("fixture path fits in a tar header");
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar_builder
                .append(&header, data)
                .expect("in-memory tar append");
        };

        for i in 0..file_count {
            if i % 2 == 0 {
                append(format!("package/file{}.js", i), &filler);
            } else {
                append(format!("package/lib/file{}.js", i), &filler);
            }
        }
        append("package/target.js".to_string(), b"module.exports = 42;\n");

        let mut gz_encoder = tar_builder.into_inner().expect("tar trailer");
        gz_encoder.flush().expect("gzip flush");
        gz_encoder.finish().expect("gzip finish");
    }
    tarball_data
}

/// Sample bodies for each sniffing rule family
pub fn sniff_samples() -> Vec<(&'static str, Vec<u8>)> {
    let json = serde_json::to_vec(&serde_json::json!({
        "name": "fixture",
        "version": "1.0.0",
        "files": (0..200).map(|i| format!("dist/file{}.js", i)).collect::<Vec<_>>(),
    }))
    .expect("fixture json serializes");

    vec![
        ("png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec()),
        ("html", b"<!DOCTYPE html>\n<html><head><title>x</title></head></html>".to_vec()),
        ("json", json),
        ("javascript", b"const leftPad = require('./left-pad');\n".repeat(64)),
        ("markdown", b"# fixture\n\nSome *text* here.\n".repeat(64)),
        ("binary", (0..=255u8).cycle().take(4096).collect()),
    ]
}
