//! Chunked Convolution - Reverb via Windowed FFT Convolution
//!
//! The reverb tail is the dry signal convolved with the decay kernel.
//! Doing that in one shot means a convolution as long as the whole track;
//! instead the signal is cut into fixed-size chunks, each chunk is
//! convolved on its own, and the results are stitched back together.
//!
//! # Chunking and Crossfade
//!
//! ```text
//! dry      ──┬────────────┬────────────┬────────────┬───
//! chunks     [── chunk 0 ──]
//!                      [── chunk 1 ──]
//!                               [── chunk 2 ──]
//!                      ↑↑
//!            crossfade region (overlap samples)
//! ```
//!
//! Chunks start every `chunk_size - overlap` samples, so each chunk's
//! head lands on the previous chunk's tail. Writing chunk outputs butt to
//! butt would leave seams at the joins - the kernel tails of adjacent
//! chunks don't sum correctly there and the discontinuity is audible as a
//! click. Over the first `overlap` samples of every non-first chunk the
//! previous content is faded out while the new chunk fades in:
//!
//! ```text
//! tail[i+k] = old[k] * fade_out[k] + new[k] * fade_in[k]
//! ```
//!
//! with linear ramps whose endpoints are inclusive: `fade_in[0] = 0`, so
//! the first blended sample keeps the previous chunk's value exactly, and
//! every blended sample stays within the range spanned by old and new.
//!
//! # Same-Mode Alignment
//!
//! Each chunk uses "same"-mode convolution: the full convolution trimmed
//! to the chunk's own length with a centered kernel. Output index `k`
//! corresponds to full-convolution index `k + (kernel_len - 1) / 2`
//! (integer division), i.e. input sample `k` lines up with the kernel tap
//! at `(kernel_len - 1) / 2`. This is the convention NumPy's
//! `mode="same"` uses and it is applied consistently for even and odd
//! kernel lengths.
//!
//! The convolutions themselves run through an FFT (multiply spectra,
//! inverse transform) with the kernel spectrum computed once and reused
//! for every chunk.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{Error, Result};

/// Same-mode convolver with a fixed kernel and input length.
///
/// Pads both operands to a shared power-of-two FFT length, caches the
/// kernel spectrum, and reuses its buffers across `process` calls.
struct SameConvolver {
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    fft_len: usize,
    signal_len: usize,
    /// Index of the kernel's zero-lag tap: `(kernel_len - 1) / 2`.
    center: usize,
    kernel_spectrum: Vec<Complex<f32>>,
    buffer: Vec<Complex<f32>>,
}

impl SameConvolver {
    fn new(kernel: &[f32], signal_len: usize) -> Self {
        debug_assert!(!kernel.is_empty());
        debug_assert!(signal_len > 0);

        let full_len = signal_len + kernel.len() - 1;
        let fft_len = full_len.next_power_of_two();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);
        let ifft = planner.plan_fft_inverse(fft_len);

        let mut kernel_spectrum = vec![Complex::new(0.0, 0.0); fft_len];
        for (slot, &k) in kernel_spectrum.iter_mut().zip(kernel.iter()) {
            slot.re = k;
        }
        fft.process(&mut kernel_spectrum);

        Self {
            fft,
            ifft,
            fft_len,
            signal_len,
            center: (kernel.len() - 1) / 2,
            kernel_spectrum,
            buffer: vec![Complex::new(0.0, 0.0); fft_len],
        }
    }

    /// Convolve `signal` (conceptually zero-padded to `signal_len`) with
    /// the kernel and write the `signal_len` centered samples into `out`.
    fn process(&mut self, signal: &[f32], out: &mut Vec<f32>) {
        debug_assert!(signal.len() <= self.signal_len);

        self.buffer.fill(Complex::new(0.0, 0.0));
        for (slot, &s) in self.buffer.iter_mut().zip(signal.iter()) {
            slot.re = s;
        }

        self.fft.process(&mut self.buffer);
        for (slot, &k) in self.buffer.iter_mut().zip(self.kernel_spectrum.iter()) {
            *slot *= k;
        }
        self.ifft.process(&mut self.buffer);

        // rustfft does not normalize; a forward/inverse pair scales by fft_len
        let norm = 1.0 / self.fft_len as f32;
        out.clear();
        out.extend(
            self.buffer[self.center..self.center + self.signal_len]
                .iter()
                .map(|c| c.re * norm),
        );
    }
}

/// One-shot same-mode convolution.
///
/// Returns `signal.len()` samples; see the module docs for the alignment
/// convention. An empty signal or an empty kernel yields an empty result
/// (unlike [`convolve_chunked`], which has a `Result` surface and rejects
/// an empty kernel outright).
pub fn convolve_same(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let mut conv = SameConvolver::new(kernel, signal.len());
    let mut out = Vec::with_capacity(signal.len());
    conv.process(signal, &mut out);
    out
}

/// Convolve `dry` with `kernel` in crossfaded chunks.
///
/// Equivalent to [`convolve_chunked_observed`] without a progress sink.
pub fn convolve_chunked(
    dry: &[f32],
    kernel: &[f32],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<f32>> {
    convolve_chunked_observed(dry, kernel, chunk_size, overlap, |_, _| {})
}

/// Convolve `dry` with `kernel` in crossfaded chunks, reporting progress.
///
/// The output has exactly `dry.len()` samples. Chunk starts advance by
/// `chunk_size - overlap`; a trailing partial chunk is zero-padded to
/// `chunk_size` before convolution and its result clipped back to the
/// true signal length. After each chunk, `on_chunk(done, total)` is
/// invoked; the sink observes only, it cannot alter the result.
///
/// Fails with `InvalidParameter` when `chunk_size == 0`, `overlap == 0`,
/// `overlap >= chunk_size`, or the kernel is empty.
pub fn convolve_chunked_observed(
    dry: &[f32],
    kernel: &[f32],
    chunk_size: usize,
    overlap: usize,
    mut on_chunk: impl FnMut(usize, usize),
) -> Result<Vec<f32>> {
    if chunk_size == 0 {
        return Err(Error::InvalidParameter(
            "chunk_size must be positive".into(),
        ));
    }
    if overlap == 0 {
        return Err(Error::InvalidParameter("overlap must be positive".into()));
    }
    if overlap >= chunk_size {
        return Err(Error::InvalidParameter(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    if kernel.is_empty() {
        return Err(Error::InvalidParameter("kernel must not be empty".into()));
    }
    if dry.is_empty() {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let total = dry.len().div_ceil(stride);

    let mut conv = SameConvolver::new(kernel, chunk_size);
    let mut tail = vec![0.0f32; dry.len()];
    let mut padded = vec![0.0f32; chunk_size];
    let mut convolved = Vec::with_capacity(chunk_size);

    let mut done = 0;
    let mut i = 0;
    while i < dry.len() {
        let end = (i + chunk_size).min(dry.len());
        let writable = end - i;

        padded[..writable].copy_from_slice(&dry[i..end]);
        padded[writable..].fill(0.0);
        conv.process(&padded, &mut convolved);

        if i == 0 {
            tail[..writable].copy_from_slice(&convolved[..writable]);
        } else {
            // tail[i..i+overlap] holds the previous chunk's trailing
            // samples; blend rather than overwrite. Endpoint-inclusive
            // ramps: k / (overlap - 1) runs 0 -> 1.
            let fade_len = overlap.min(writable);
            let denom = (overlap - 1).max(1) as f32;
            for k in 0..fade_len {
                let fade_in = k as f32 / denom;
                tail[i + k] = tail[i + k] * (1.0 - fade_in) + convolved[k] * fade_in;
            }
            tail[i + fade_len..end].copy_from_slice(&convolved[fade_len..writable]);
        }

        done += 1;
        on_chunk(done, total);
        i += stride;
    }

    Ok(tail)
}
