//! Tempo estimation and the stretch-ratio calculation.
//!
//! # Onset Envelope + Autocorrelation
//!
//! Beats show up as bursts of new spectral energy. The estimator walks
//! the signal in Hann-windowed FFT frames and sums the positive
//! magnitude differences between consecutive frames (spectral flux),
//! giving one "onset strength" value per frame. A steady tempo makes
//! that envelope periodic, so its autocorrelation peaks at the beat
//! period; the best lag inside the 60-200 BPM range, refined by
//! parabolic interpolation between neighboring lags, maps back to BPM
//! through the frame rate. The raw argmax is biased toward sub-harmonics
//! when the true period is a non-integer number of frames, so a
//! comparable peak near half the winning lag takes precedence.
//!
//! The estimate is a plain scalar - callers never see frames, lags or
//! array-shaped results.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{Error, Result};

/// Analysis frame length for the onset envelope.
const FFT_SIZE: usize = 2048;
/// Samples between analysis frames.
const HOP_SIZE: usize = 512;
/// Search range for the beat period.
const MIN_BPM: f32 = 60.0;
const MAX_BPM: f32 = 200.0;
/// How strong a half-period peak must be, relative to the winning lag,
/// to take over as the beat period.
const OCTAVE_TOLERANCE: f32 = 0.7;

/// Convert a desired target tempo and a source tempo into the playback
/// rate for the time stretch: `target_bpm / source_bpm`.
///
/// A target below the source gives a rate below 1.0, which slows the
/// track. Fails with `InvalidParameter` when either tempo is
/// non-positive or non-finite.
pub fn compute_ratio(target_bpm: f32, source_bpm: f32) -> Result<f32> {
    if !target_bpm.is_finite() || target_bpm <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "target BPM must be positive, got {target_bpm}"
        )));
    }
    if !source_bpm.is_finite() || source_bpm <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "source BPM must be positive, got {source_bpm}"
        )));
    }
    Ok(target_bpm / source_bpm)
}

/// Estimate the tempo of a mono signal in beats per minute.
///
/// Fails with `InvalidParameter` when the signal is too short to frame
/// (a couple of seconds are needed to see a 60 BPM period) and with
/// `SilentSignal` when the onset envelope carries no energy at all.
pub fn estimate_bpm(samples: &[f32], sample_rate: u32) -> Result<f32> {
    if sample_rate == 0 {
        return Err(Error::InvalidParameter("sample rate must be positive".into()));
    }

    let frame_rate = sample_rate as f32 / HOP_SIZE as f32;
    let min_lag = ((60.0 * frame_rate / MAX_BPM).floor() as usize).max(1);
    let max_lag = (60.0 * frame_rate / MIN_BPM).ceil() as usize;

    let mut envelope = onset_envelope(samples);
    // Need to see the longest candidate period at least twice.
    if envelope.len() < 2 * max_lag {
        return Err(Error::InvalidParameter(format!(
            "signal too short for tempo estimation: {} onset frames, need {}",
            envelope.len(),
            2 * max_lag
        )));
    }
    if envelope.iter().all(|&v| v == 0.0) {
        return Err(Error::SilentSignal);
    }

    // Remove the mean so sustained energy doesn't swamp the periodicity.
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    for v in &mut envelope {
        *v -= mean;
    }

    let autocorr: Vec<f32> = (0..=max_lag.min(envelope.len() - 1))
        .map(|lag| {
            envelope[..envelope.len() - lag]
                .iter()
                .zip(envelope[lag..].iter())
                .map(|(&a, &b)| a * b)
                .sum()
        })
        .collect();

    let mut best_lag = (min_lag..autocorr.len())
        .max_by(|&a, &b| autocorr[a].total_cmp(&autocorr[b]))
        .ok_or_else(|| Error::InvalidParameter("empty tempo search range".into()))?;

    // Octave correction. A beat period that is a non-integer number of
    // frames loses correlation to rounding at every integer lag, while
    // its double period can land almost exactly on an integer lag and
    // win the argmax. When a comparable peak exists near half the
    // winning lag, the faster tempo is the real one.
    while autocorr[best_lag] > 0.0 {
        let half = best_lag / 2;
        if half < min_lag {
            break;
        }
        let lo = half.saturating_sub(1).max(min_lag);
        let hi = (half + 1).min(best_lag - 1);
        if lo > hi {
            break;
        }
        let candidate = (lo..=hi)
            .max_by(|&a, &b| autocorr[a].total_cmp(&autocorr[b]))
            .unwrap_or(lo);
        if autocorr[candidate] >= OCTAVE_TOLERANCE * autocorr[best_lag] {
            best_lag = candidate;
        } else {
            break;
        }
    }

    let refined = refine_peak(&autocorr, best_lag);
    Ok(60.0 * frame_rate / refined)
}

/// Spectral-flux onset strength, one value per analysis frame.
fn onset_envelope(samples: &[f32]) -> Vec<f32> {
    if samples.len() < FFT_SIZE {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);

    let window: Vec<f32> = (0..FFT_SIZE)
        .map(|i| {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / (FFT_SIZE - 1) as f32;
            0.5 * (1.0 - angle.cos())
        })
        .collect();

    let num_frames = (samples.len() - FFT_SIZE) / HOP_SIZE + 1;
    let mut envelope = Vec::with_capacity(num_frames);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); FFT_SIZE];
    let mut prev_magnitudes = vec![0.0f32; FFT_SIZE / 2];

    for frame_idx in 0..num_frames {
        let start = frame_idx * HOP_SIZE;
        let frame = &samples[start..start + FFT_SIZE];

        for (slot, (&s, &w)) in buffer.iter_mut().zip(frame.iter().zip(window.iter())) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut buffer);

        let mut flux = 0.0;
        for (i, c) in buffer[..FFT_SIZE / 2].iter().enumerate() {
            let magnitude = c.norm();
            let diff = magnitude - prev_magnitudes[i];
            if diff > 0.0 {
                flux += diff;
            }
            prev_magnitudes[i] = magnitude;
        }
        envelope.push(flux);
    }

    envelope
}

/// Parabolic interpolation around an autocorrelation peak, giving a
/// fractional lag. Falls back to the integer lag at the array edges or
/// on a degenerate (flat) neighborhood.
fn refine_peak(autocorr: &[f32], lag: usize) -> f32 {
    if lag == 0 || lag + 1 >= autocorr.len() {
        return lag as f32;
    }
    let left = autocorr[lag - 1];
    let mid = autocorr[lag];
    let right = autocorr[lag + 1];
    let denom = left - 2.0 * mid + right;
    if denom.abs() < f32::EPSILON {
        return lag as f32;
    }
    let delta = (0.5 * (left - right) / denom).clamp(-0.5, 0.5);
    lag as f32 + delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ratio_slowing_and_speeding() {
        assert_relative_eq!(compute_ratio(170.0, 85.0).unwrap(), 2.0);
        assert_relative_eq!(compute_ratio(85.0, 170.0).unwrap(), 0.5);
        assert_relative_eq!(compute_ratio(100.0, 100.0).unwrap(), 1.0);
    }

    #[test]
    fn test_ratio_rejects_bad_tempi() {
        assert!(compute_ratio(0.0, 100.0).is_err());
        assert!(compute_ratio(100.0, 0.0).is_err());
        assert!(compute_ratio(-85.0, 100.0).is_err());
        assert!(compute_ratio(100.0, -85.0).is_err());
        assert!(compute_ratio(f32::NAN, 100.0).is_err());
        assert!(compute_ratio(100.0, f32::INFINITY).is_err());
    }

    /// Impulse train at the given BPM with a little decay per click.
    fn click_track(bpm: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let len = (sample_rate as f32 * seconds) as usize;
        let period = (60.0 / bpm * sample_rate as f32) as usize;
        let mut samples = vec![0.0f32; len];
        let mut pos = 0;
        while pos < len {
            for k in 0..64.min(len - pos) {
                samples[pos + k] = (1.0 - k as f32 / 64.0) * if k % 2 == 0 { 1.0 } else { -1.0 };
            }
            pos += period;
        }
        samples
    }

    #[test]
    fn test_estimates_click_track_tempo() {
        let samples = click_track(120.0, 22_050, 10.0);
        let bpm = estimate_bpm(&samples, 22_050).unwrap();
        assert!(
            (bpm - 120.0).abs() < 4.0,
            "expected ~120 BPM, estimated {bpm}"
        );
    }

    #[test]
    fn test_estimates_slower_tempo() {
        let samples = click_track(80.0, 22_050, 12.0);
        let bpm = estimate_bpm(&samples, 22_050).unwrap();
        assert!((bpm - 80.0).abs() < 4.0, "expected ~80 BPM, estimated {bpm}");
    }

    #[test]
    fn test_fractional_period_not_halved_to_subharmonic() {
        // At 22.05 kHz the 120 BPM beat period is ~21.5 frames, so its
        // double sits almost exactly on an integer lag and would win a
        // plain argmax; the estimate must still come back near 120, not 60.
        let samples = click_track(120.0, 22_050, 10.0);
        let bpm = estimate_bpm(&samples, 22_050).unwrap();
        assert!(bpm > 100.0, "collapsed to a sub-harmonic: estimated {bpm}");
    }

    #[test]
    fn test_octave_correction_leaves_true_tempo_alone() {
        // 70 BPM has no half-period peak inside the search range, so the
        // octave check must not promote a spurious faster tempo.
        let samples = click_track(70.0, 22_050, 12.0);
        let bpm = estimate_bpm(&samples, 22_050).unwrap();
        assert!((bpm - 70.0).abs() < 4.0, "expected ~70 BPM, estimated {bpm}");
    }

    #[test]
    fn test_silence_is_rejected() {
        let samples = vec![0.0f32; 22_050 * 10];
        assert!(matches!(
            estimate_bpm(&samples, 22_050),
            Err(Error::SilentSignal)
        ));
    }

    #[test]
    fn test_short_signal_rejected() {
        let samples = click_track(120.0, 22_050, 0.5);
        assert!(matches!(
            estimate_bpm(&samples, 22_050),
            Err(Error::InvalidParameter(_))
        ));
    }
}
