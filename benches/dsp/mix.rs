//! Benchmarks for mixing and normalization.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vapor::dsp::mix_and_normalize;

use crate::dsp::test_signal;
use crate::SIGNAL_LENGTHS;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &len in SIGNAL_LENGTHS {
        let dry = test_signal(len);
        let tail: Vec<f32> = dry.iter().map(|s| s * 0.3).collect();
        group.bench_with_input(BenchmarkId::new("mix_and_normalize", len), &len, |b, _| {
            b.iter(|| mix_and_normalize(black_box(&dry), black_box(&tail), 0.5).unwrap())
        });
    }

    group.finish();
}
