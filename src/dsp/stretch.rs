//! Phase-vocoder time stretching.
//!
//! Changes a signal's duration without changing its pitch. The signal is
//! analyzed in overlapping Hann-windowed FFT frames taken every
//! `hop_analysis` samples and resynthesized with a different hop: a
//! synthesis hop larger than the analysis hop spreads the frames out
//! (slower playback), a smaller one packs them together. Per-bin phases
//! are re-accumulated from the measured frame-to-frame phase advance so
//! sinusoids stay coherent across the re-spaced frames.
//!
//! `rate` follows the usual convention: `rate < 1.0` slows playback and
//! lengthens the output, `rate > 1.0` speeds it up. The output is
//! trimmed (or zero-padded) to `round(len / rate)` samples so callers
//! get a predictable length.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{Error, Result};

const TWO_PI: f32 = 2.0 * PI;
/// Floor for overlap-add window-sum normalization.
const WINDOW_SUM_EPSILON: f32 = 1e-6;
/// Default analysis frame length.
const DEFAULT_FFT_SIZE: usize = 2048;
/// Default analysis hop: 75% frame overlap.
const DEFAULT_HOP: usize = DEFAULT_FFT_SIZE / 4;

/// Phase vocoder with a fixed rate and frame geometry.
pub struct TimeStretcher {
    fft_size: usize,
    hop_analysis: usize,
    hop_synthesis: usize,
    rate: f32,
    window: Vec<f32>,
    /// Expected per-frame phase advance for each bin at the analysis hop.
    expected_advance: Vec<f32>,
    phase_accum: Vec<f32>,
    prev_phase: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl TimeStretcher {
    /// Create a stretcher for the given playback rate.
    ///
    /// Fails with `InvalidParameter` when the rate is non-positive or
    /// non-finite.
    pub fn new(fft_size: usize, hop_analysis: usize, rate: f32) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "stretch rate must be positive and finite, got {rate}"
            )));
        }
        if fft_size < 2 || hop_analysis == 0 || hop_analysis > fft_size {
            return Err(Error::InvalidParameter(format!(
                "bad frame geometry: fft_size {fft_size}, hop {hop_analysis}"
            )));
        }

        let hop_synthesis = ((hop_analysis as f64 / rate as f64).round() as usize).max(1);
        let num_bins = fft_size / 2 + 1;

        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let angle = TWO_PI * i as f32 / (fft_size - 1) as f32;
                0.5 * (1.0 - angle.cos())
            })
            .collect();

        let expected_advance: Vec<f32> = (0..num_bins)
            .map(|bin| TWO_PI * bin as f32 * hop_analysis as f32 / fft_size as f32)
            .collect();

        let mut planner = FftPlanner::new();
        Ok(Self {
            fft_size,
            hop_analysis,
            hop_synthesis,
            rate,
            window,
            expected_advance,
            phase_accum: vec![0.0; num_bins],
            prev_phase: vec![0.0; num_bins],
            fft: planner.plan_fft_forward(fft_size),
            ifft: planner.plan_fft_inverse(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            magnitudes: vec![0.0; num_bins],
        })
    }

    /// Stretch a mono signal to `round(input.len() / rate)` samples.
    ///
    /// Inputs shorter than one analysis frame are zero-padded before
    /// processing; an empty input yields an empty output.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if input.is_empty() {
            return Vec::new();
        }
        let target_len = (input.len() as f64 / self.rate as f64).round() as usize;

        let padded_storage;
        let frames_input = if input.len() < self.fft_size {
            let mut padded = input.to_vec();
            padded.resize(self.fft_size, 0.0);
            padded_storage = padded;
            &padded_storage[..]
        } else {
            input
        };

        let num_bins = self.fft_size / 2 + 1;
        let num_frames = (frames_input.len() - self.fft_size) / self.hop_analysis + 1;
        let output_len = (num_frames - 1) * self.hop_synthesis + self.fft_size;

        let mut output = vec![0.0f32; output_len];
        let mut window_sum = vec![0.0f32; output_len];

        self.phase_accum.fill(0.0);
        self.prev_phase.fill(0.0);

        let hop_ratio = self.hop_synthesis as f32 / self.hop_analysis as f32;
        let norm = 1.0 / self.fft_size as f32;

        for frame_idx in 0..num_frames {
            let analysis_pos = frame_idx * self.hop_analysis;
            let synthesis_pos = frame_idx * self.hop_synthesis;

            let frame = &frames_input[analysis_pos..analysis_pos + self.fft_size];
            for (slot, (&sample, &win)) in self
                .buffer
                .iter_mut()
                .zip(frame.iter().zip(self.window.iter()))
            {
                *slot = Complex::new(sample * win, 0.0);
            }
            self.fft.process(&mut self.buffer);

            for bin in 0..num_bins {
                let c = self.buffer[bin];
                self.magnitudes[bin] = c.norm();
                let phase = c.arg();

                if frame_idx == 0 {
                    // First frame sets the synthesis phase directly.
                    self.phase_accum[bin] = phase;
                } else {
                    let expected = self.expected_advance[bin];
                    let deviation = wrap_phase(phase - self.prev_phase[bin] - expected);
                    self.phase_accum[bin] += (expected + deviation) * hop_ratio;
                }
                self.prev_phase[bin] = phase;
            }

            // Rebuild the spectrum from magnitude + accumulated phase and
            // mirror the negative frequencies for a real inverse FFT.
            for bin in 0..num_bins {
                self.buffer[bin] =
                    Complex::from_polar(self.magnitudes[bin], self.phase_accum[bin]);
            }
            for bin in 1..num_bins - 1 {
                self.buffer[self.fft_size - bin] = self.buffer[bin].conj();
            }
            self.ifft.process(&mut self.buffer);

            for i in 0..self.fft_size {
                let out_idx = synthesis_pos + i;
                output[out_idx] += self.buffer[i].re * norm * self.window[i];
                window_sum[out_idx] += self.window[i] * self.window[i];
            }
        }

        for (sample, &ws) in output.iter_mut().zip(window_sum.iter()) {
            *sample /= ws.max(WINDOW_SUM_EPSILON);
        }

        output.resize(target_len, 0.0);
        output
    }
}

/// Stretch a mono signal with the default frame geometry.
///
/// `rate < 1.0` slows playback (longer output), `rate > 1.0` speeds it
/// up. A rate of exactly 1.0 returns the input unchanged.
pub fn time_stretch(input: &[f32], rate: f32) -> Result<Vec<f32>> {
    if rate == 1.0 {
        return Ok(input.to_vec());
    }
    let mut stretcher = TimeStretcher::new(DEFAULT_FFT_SIZE, DEFAULT_HOP, rate)?;
    Ok(stretcher.process(input))
}

/// Wrap a phase value to `[-PI, PI]`.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let p = phase + PI;
    p - (p / TWO_PI).floor() * TWO_PI - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TWO_PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    fn rms(signal: &[f32]) -> f32 {
        (signal.iter().map(|s| s * s).sum::<f32>() / signal.len() as f32).sqrt()
    }

    #[test]
    fn test_wrap_phase_range() {
        assert!((wrap_phase(0.0)).abs() < 1e-6);
        assert!((wrap_phase(PI + 0.1) - (-PI + 0.1)).abs() < 1e-5);
        assert!((wrap_phase(-PI - 0.1) - (PI - 0.1)).abs() < 1e-5);
        assert!((wrap_phase(7.0 * TWO_PI + 0.3) - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_unity_rate_is_identity() {
        let input = sine(440.0, 44_100.0, 10_000);
        let output = time_stretch(&input, 1.0).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_slowing_lengthens_output() {
        let input = sine(440.0, 44_100.0, 44_100);
        let output = time_stretch(&input, 0.5).unwrap();
        assert_eq!(output.len(), 88_200);
    }

    #[test]
    fn test_speeding_shortens_output() {
        let input = sine(440.0, 44_100.0, 44_100);
        let output = time_stretch(&input, 2.0).unwrap();
        assert_eq!(output.len(), 22_050);
    }

    #[test]
    fn test_stretch_preserves_energy_roughly() {
        let input = sine(440.0, 44_100.0, 4 * 4096);
        let mut stretcher = TimeStretcher::new(4096, 1024, 0.8).unwrap();
        let output = stretcher.process(&input);

        let input_rms = rms(&input);
        let output_rms = rms(&output);
        assert!(
            (output_rms - input_rms).abs() < input_rms * 0.5,
            "RMS drifted too far: input {input_rms}, output {output_rms}"
        );
    }

    #[test]
    fn test_short_input_is_padded_not_rejected() {
        let input = sine(440.0, 44_100.0, 100);
        let output = time_stretch(&input, 0.5).unwrap();
        assert_eq!(output.len(), 200);
    }

    #[test]
    fn test_empty_input() {
        let mut stretcher = TimeStretcher::new(2048, 512, 0.5).unwrap();
        assert!(stretcher.process(&[]).is_empty());
    }

    #[test]
    fn test_bad_rate_rejected() {
        assert!(time_stretch(&[0.0; 16], 0.0).is_err());
        assert!(time_stretch(&[0.0; 16], -1.0).is_err());
        assert!(time_stretch(&[0.0; 16], f32::NAN).is_err());
        assert!(time_stretch(&[0.0; 16], f32::INFINITY).is_err());
    }
}
