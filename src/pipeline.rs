//! End-to-end slowed + reverb orchestration.
//!
//! Wires the stages together in order: resolve the playback rate from
//! the tempo target, time-stretch the signal, build the decay kernel,
//! run the chunked convolution, mix and normalize. The pipeline itself
//! never prints or logs; observability goes through a caller-supplied
//! progress sink, and leaving the sink empty changes nothing about the
//! result.

use crate::analysis::tempo;
use crate::dsp::{convolve, kernel, mix, stretch};
use crate::error::Result;
use crate::{
    DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, DEFAULT_RATE, DEFAULT_REVERB_AMOUNT,
    DEFAULT_REVERB_SECONDS,
};

/// How the playback rate is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TempoTarget {
    /// Use this rate directly (`< 1.0` slows the track).
    Rate(f32),
    /// Stretch toward a tempo. The source tempo is estimated from the
    /// signal unless supplied.
    TargetBpm { target: f32, source: Option<f32> },
}

/// Parameters for one slowed + reverb invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowReverbParams {
    pub tempo: TempoTarget,
    /// Decay kernel duration in seconds.
    pub reverb_seconds: f32,
    /// Wet level mixed against the dry signal.
    pub reverb_amount: f32,
    /// Convolution chunk length in samples.
    pub chunk_size: usize,
    /// Crossfade overlap between adjacent chunks in samples.
    pub overlap: usize,
}

impl Default for SlowReverbParams {
    fn default() -> Self {
        Self {
            tempo: TempoTarget::Rate(DEFAULT_RATE),
            reverb_seconds: DEFAULT_REVERB_SECONDS,
            reverb_amount: DEFAULT_REVERB_AMOUNT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Progress events delivered to the pipeline's sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Source tempo estimated from the signal.
    TempoEstimated { bpm: f32 },
    /// Time stretch starting at the resolved rate.
    Stretching { rate: f32 },
    /// A convolution chunk finished.
    ReverbChunk { done: usize, total: usize },
    /// Final mix and normalization starting.
    Mixing,
}

/// Apply the slowed + reverb transformation to a mono signal.
///
/// Returns the processed signal at the same sample rate, normalized to a
/// peak of 1.0. All failures from the stages propagate unchanged; see
/// [`crate::Error`] for the taxonomy.
pub fn slow_reverb(
    samples: &[f32],
    sample_rate: u32,
    params: &SlowReverbParams,
    mut progress: impl FnMut(Progress),
) -> Result<Vec<f32>> {
    let rate = match params.tempo {
        TempoTarget::Rate(rate) => rate,
        TempoTarget::TargetBpm { target, source } => {
            let source_bpm = match source {
                Some(bpm) => bpm,
                None => {
                    let bpm = tempo::estimate_bpm(samples, sample_rate)?;
                    progress(Progress::TempoEstimated { bpm });
                    bpm
                }
            };
            tempo::compute_ratio(target, source_bpm)?
        }
    };

    progress(Progress::Stretching { rate });
    let stretched = stretch::time_stretch(samples, rate)?;

    let decay = kernel::build_kernel(sample_rate, params.reverb_seconds)?;
    let tail = convolve::convolve_chunked_observed(
        &stretched,
        &decay,
        params.chunk_size,
        params.overlap,
        |done, total| progress(Progress::ReverbChunk { done, total }),
    )?;

    progress(Progress::Mixing);
    mix::mix_and_normalize(&stretched, &tail, params.reverb_amount)
}
