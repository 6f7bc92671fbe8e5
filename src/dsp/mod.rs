//! Signal-processing core of the slowed + reverb transformation.
//!
//! These components operate on plain `&[f32]` mono sample buffers and stay
//! focused on the math: building the decay kernel, convolving it against
//! the dry signal in crossfaded chunks, stretching time, and mixing the
//! result down to a normalized output. Orchestration, file I/O and
//! progress reporting live elsewhere.

/// Windowed FFT convolution with crossfaded chunk stitching.
pub mod convolve;
/// Exponential decay impulse response.
pub mod kernel;
/// Dry/wet mixing and peak normalization.
pub mod mix;
/// Phase-vocoder time stretching.
pub mod stretch;

pub use convolve::{convolve_chunked, convolve_chunked_observed, convolve_same};
pub use kernel::build_kernel;
pub use mix::mix_and_normalize;
pub use stretch::time_stretch;
