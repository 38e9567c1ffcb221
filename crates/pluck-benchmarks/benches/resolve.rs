//! Version selection benchmarks
//!
//! Measures range parsing and max-satisfying selection over packuments of
//! increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pluck_benchmarks::{criterion_config, version_list};
use pluck_core::types::VersionReq;
use pluck_resolver::VersionSelector;

const RANGES: &[&str] = &[
    "^1.2.3",
    "~2.4",
    ">=1.0.0 <3.0.0-0",
    "1.x || 3.x",
    "0.5.0 - 2.7.9",
    "*",
];

fn bench_range_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_parsing");
    for range in RANGES {
        group.bench_with_input(BenchmarkId::from_parameter(range), range, |b, range| {
            b.iter(|| black_box(VersionReq::parse(black_box(range))))
        });
    }
    group.finish();
}

fn bench_version_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_selection");

    for version_count in [10usize, 100, 1000] {
        let versions = version_list(version_count);
        let reqs: Vec<VersionReq> = RANGES
            .iter()
            .map(|range| VersionReq::parse(range).expect("benchmark range parses"))
            .collect();

        group.throughput(Throughput::Elements(version_count as u64));
        group.bench_with_input(
            BenchmarkId::new("versions", version_count),
            &versions,
            |b, versions| {
                b.iter(|| {
                    let selector = VersionSelector::new(versions.iter().map(String::as_str));
                    for req in &reqs {
                        black_box(selector.max_satisfying(req));
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_range_parsing, bench_version_selection
}
criterion_main!(benches);
