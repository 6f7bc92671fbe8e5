//! vapor - slowed + reverb for WAV files
//!
//! Run with: cargo run --release -- input.wav output.wav --target-bpm 85

use std::io::Write as _;
use std::path::PathBuf;

use clap::Parser;
use vapor::{io, slow_reverb, Progress, SlowReverbParams, TempoTarget};

#[derive(Parser)]
#[command(
    name = "vapor",
    about = "Slow a track toward a target tempo and drench it in reverb"
)]
struct Args {
    /// Input WAV file
    input: PathBuf,
    /// Output WAV file (written as 32-bit float mono)
    output: PathBuf,

    /// Playback rate; < 1.0 slows the track down
    #[arg(long, conflicts_with = "target_bpm")]
    rate: Option<f32>,

    /// Desired tempo in BPM; the source tempo is estimated from the
    /// audio unless --source-bpm is given
    #[arg(long)]
    target_bpm: Option<f32>,

    /// Source tempo override, skips estimation
    #[arg(long, requires = "target_bpm")]
    source_bpm: Option<f32>,

    /// Wet level of the reverb tail
    #[arg(long, default_value_t = vapor::DEFAULT_REVERB_AMOUNT)]
    amount: f32,

    /// Reverb kernel duration in seconds
    #[arg(long, default_value_t = vapor::DEFAULT_REVERB_SECONDS)]
    reverb_seconds: f32,

    /// Convolution chunk length in samples
    #[arg(long, default_value_t = vapor::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Crossfade overlap between chunks in samples
    #[arg(long, default_value_t = vapor::DEFAULT_OVERLAP)]
    overlap: usize,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let tempo = match (args.rate, args.target_bpm) {
        (Some(rate), _) => TempoTarget::Rate(rate),
        (None, Some(target)) => TempoTarget::TargetBpm {
            target,
            source: args.source_bpm,
        },
        (None, None) => TempoTarget::Rate(vapor::DEFAULT_RATE),
    };
    let params = SlowReverbParams {
        tempo,
        reverb_seconds: args.reverb_seconds,
        reverb_amount: args.amount,
        chunk_size: args.chunk_size,
        overlap: args.overlap,
    };

    let (samples, sample_rate) = io::read_mono(&args.input)?;
    if !args.quiet {
        eprintln!(
            "loaded {}: {} samples at {} Hz",
            args.input.display(),
            samples.len(),
            sample_rate
        );
    }

    let quiet = args.quiet;
    let processed = slow_reverb(&samples, sample_rate, &params, |progress| {
        if quiet {
            return;
        }
        match progress {
            Progress::TempoEstimated { bpm } => {
                eprintln!("estimated source tempo: {bpm:.2} BPM");
            }
            Progress::Stretching { rate } => eprintln!("stretching at rate {rate:.3}"),
            Progress::ReverbChunk { done, total } => {
                eprint!("\rapplying reverb: chunk {done}/{total}");
                let _ = std::io::stderr().flush();
                if done == total {
                    eprintln!();
                }
            }
            Progress::Mixing => eprintln!("mixing and normalizing"),
        }
    })?;

    io::write_mono(&args.output, &processed, sample_rate)?;
    if !quiet {
        eprintln!(
            "wrote {} ({} samples)",
            args.output.display(),
            processed.len()
        );
    }
    Ok(())
}
