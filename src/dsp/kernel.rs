//! Exponential decay kernel - the synthetic room response.
//!
//! Real rooms reflect sound back as a dense tail of echoes whose energy
//! dies off roughly exponentially. Instead of measuring an impulse
//! response, we synthesize one: a curve that starts at 1.0 and decays to
//! `e^-5` (about -43 dB) over the kernel's duration. Convolving a signal
//! with this curve smears every sample into a fading echo.

use crate::error::{Error, Result};

/// Exponent reached at the end of the kernel: the tail falls to `e^-5`.
const DECAY_EXPONENT: f32 = 5.0;

/// Build an exponential decay kernel.
///
/// The kernel has `round(sample_rate * duration_seconds)` samples; sample
/// `i` is `exp(-5 * i / (len - 1))`, so the curve runs from exactly 1.0
/// down to exactly `e^-5` and is strictly decreasing in between.
///
/// Fails with `InvalidParameter` when the duration resolves to fewer than
/// two samples.
pub fn build_kernel(sample_rate: u32, duration_seconds: f32) -> Result<Vec<f32>> {
    let reverb_len = (sample_rate as f64 * duration_seconds as f64).round() as i64;
    if reverb_len < 2 {
        return Err(Error::InvalidParameter(format!(
            "reverb kernel needs at least 2 samples, got {reverb_len} \
             ({sample_rate} Hz x {duration_seconds} s)"
        )));
    }

    let len = reverb_len as usize;
    let denom = (len - 1) as f32;
    Ok((0..len)
        .map(|i| (-DECAY_EXPONENT * i as f32 / denom).exp())
        .collect())
}
