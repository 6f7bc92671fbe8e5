//! Dry/wet mixing and peak normalization.
//!
//! The final stage of the effect: blend the reverb tail into the dry
//! signal at a configurable weight, then rescale so the loudest sample
//! sits at exactly ±1.0. Normalizing by the true peak means the output
//! never clips, whatever the mix weight did to the levels.

use crate::error::{Error, Result};

/// Mix `tail` into `dry` and normalize to a peak of 1.0.
///
/// output = (dry + reverb_amount * tail) / max(abs(...))
///
/// `reverb_amount` is typically in `[0, 1]` but is not enforced; values
/// outside simply widen or narrow the blend. Fails with `LengthMismatch`
/// when the two signals differ in length, and with `SilentSignal` when
/// the mixed signal is all zeros (an empty signal counts as silent) -
/// normalizing it would divide by zero.
pub fn mix_and_normalize(dry: &[f32], tail: &[f32], reverb_amount: f32) -> Result<Vec<f32>> {
    if dry.len() != tail.len() {
        return Err(Error::LengthMismatch {
            dry: dry.len(),
            tail: tail.len(),
        });
    }

    let mut wet: Vec<f32> = dry
        .iter()
        .zip(tail.iter())
        .map(|(&d, &t)| d + reverb_amount * t)
        .collect();

    let peak = wet.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak == 0.0 {
        return Err(Error::SilentSignal);
    }

    for sample in &mut wet {
        *sample /= peak;
    }
    Ok(wet)
}
