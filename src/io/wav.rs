//! WAV decode/encode via hound.
//!
//! The pipeline works on mono f32 buffers in `[-1, 1]`; these helpers do
//! the format conversion at the boundary. Integer WAV samples are scaled
//! by the format's full-scale value, multi-channel files are averaged
//! down to mono. Output is always written as 32-bit float mono.

use std::path::Path;

use crate::error::Result;

/// Read a WAV file as a mono f32 signal, returning the samples and the
/// file's sample rate. Channels are downmixed by averaging.
pub fn read_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
    };

    if channels <= 1 {
        return Ok((samples, spec.sample_rate));
    }

    let mono: Vec<f32> = samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}

/// Write a mono f32 signal as a 32-bit float WAV file.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
