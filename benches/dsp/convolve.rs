//! Benchmarks for chunked FFT convolution.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vapor::dsp::{build_kernel, convolve_chunked};

use crate::dsp::test_signal;
use crate::SIGNAL_LENGTHS;

pub fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolve");
    group.sample_size(10);

    let kernel = build_kernel(44_100, 0.5).unwrap();

    for &len in SIGNAL_LENGTHS {
        let dry = test_signal(len);
        group.bench_with_input(BenchmarkId::new("chunked", len), &len, |b, _| {
            b.iter(|| convolve_chunked(black_box(&dry), &kernel, 8_192, 512).unwrap())
        });
    }

    // Chunk geometry sweep at a fixed one-second signal.
    let dry = test_signal(44_100);
    for &chunk_size in &[4_096usize, 8_192, 16_384, 44_100] {
        group.bench_with_input(
            BenchmarkId::new("chunk_size", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| convolve_chunked(black_box(&dry), &kernel, chunk_size, 512).unwrap())
            },
        );
    }

    group.finish();
}
