pub mod analysis; // Tempo estimation and stretch-ratio math
pub mod dsp;
pub mod error;
pub mod io;
pub mod pipeline; // End-to-end slowed + reverb orchestration

pub use error::{Error, Result};
pub use pipeline::{slow_reverb, Progress, SlowReverbParams, TempoTarget};

/// Default convolution chunk length: one second of audio at 44.1kHz.
pub const DEFAULT_CHUNK_SIZE: usize = 44_100;
/// Default crossfade overlap between adjacent chunks, in samples.
pub const DEFAULT_OVERLAP: usize = 1_000;
/// Default reverb kernel duration in seconds.
pub const DEFAULT_REVERB_SECONDS: f32 = 2.0;
/// Default wet level mixed against the dry signal.
pub const DEFAULT_REVERB_AMOUNT: f32 = 0.5;
/// Default playback rate when no tempo target is given (0.8 = 20% slower).
pub const DEFAULT_RATE: f32 = 0.8;
