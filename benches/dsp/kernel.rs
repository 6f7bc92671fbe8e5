//! Benchmarks for decay kernel construction.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vapor::dsp::build_kernel;

pub fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/kernel");

    for &duration in &[0.5f32, 1.0, 2.0, 4.0] {
        group.bench_with_input(
            BenchmarkId::new("build", format!("{duration}s")),
            &duration,
            |b, &duration| b.iter(|| build_kernel(black_box(44_100), black_box(duration)).unwrap()),
        );
    }

    group.finish();
}
