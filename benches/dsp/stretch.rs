//! Benchmarks for phase-vocoder time stretching.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vapor::dsp::time_stretch;

use crate::dsp::test_signal;

pub fn bench_stretch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/stretch");
    group.sample_size(10);

    let input = test_signal(44_100);
    for &rate in &[0.5f32, 0.8, 1.25] {
        group.bench_with_input(BenchmarkId::new("rate", format!("{rate}")), &rate, |b, &rate| {
            b.iter(|| time_stretch(black_box(&input), rate).unwrap())
        });
    }

    group.finish();
}
