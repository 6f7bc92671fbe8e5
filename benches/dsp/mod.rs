mod convolve;
mod kernel;
mod mix;
mod stretch;

pub use convolve::bench_convolve;
pub use kernel::bench_kernel;
pub use mix::bench_mix;
pub use stretch::bench_stretch;

/// Deterministic pseudo-musical test signal.
pub fn test_signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / 44_100.0;
            (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.4
                + (2.0 * std::f32::consts::PI * 330.0 * t).sin() * 0.2
        })
        .collect()
}
