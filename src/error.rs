//! Centralized error type for the vapor crate.
//!
//! Every fallible operation returns this enum so `?` propagates naturally
//! from the DSP core out through the pipeline. The core never retries and
//! never logs; callers decide what a failure means.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration: non-positive sizes, overlap not smaller
    /// than the chunk, degenerate kernel duration, bad tempo values.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Normalization would divide by zero: the mixed signal is all zeros.
    #[error("signal is silent, nothing to normalize")]
    SilentSignal,

    /// Dry and reverb-tail lengths differ when mixing. Prevented by
    /// construction in the pipeline, checked anyway.
    #[error("length mismatch: dry has {dry} samples, tail has {tail}")]
    LengthMismatch { dry: usize, tail: usize },

    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
