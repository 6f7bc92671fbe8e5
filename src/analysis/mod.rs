//! Offline audio analysis feeding the slowed + reverb pipeline.

/// Tempo estimation and stretch-ratio math.
pub mod tempo;

pub use tempo::{compute_ratio, estimate_bpm};
