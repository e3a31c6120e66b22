//! Offline note rendering command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hound::{SampleFormat, WavSpec, WavWriter};
use morphwave_synth::{Synth, midi_to_freq};

use super::common::{load_config, parse_notes, parse_override};

/// Voice pool size for offline renders.
const RENDER_VOICES: usize = 8;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Engine configuration TOML (defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// MIDI notes, comma-separated (e.g., "60,64,67" for C major)
    #[arg(long, default_value = "60,64,67")]
    notes: String,

    /// Seconds the notes are held
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Seconds rendered after the notes are released
    #[arg(long, default_value = "1.0")]
    release: f32,

    /// Note-on velocity (0-127)
    #[arg(long, default_value = "100")]
    velocity: u8,

    /// Parameter override as path=value (repeatable, e.g. "filter.freq=1200Hz")
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, f32)>,

    /// Sample rate, overriding the config
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Render block size, overriding the config
    #[arg(long)]
    block_size: Option<usize>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration >= 0.0)
        || !(args.release.is_finite() && args.release >= 0.0)
    {
        anyhow::bail!("--duration and --release must be non-negative seconds");
    }

    let notes = parse_notes(&args.notes).map_err(anyhow::Error::msg)?;
    let mut config = load_config(args.config.as_deref())?;
    for (path, value) in &args.overrides {
        config
            .set_param(path, *value)
            .with_context(|| format!("applying --set {path}={value}"))?;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.render.sample_rate = sample_rate;
    }
    if let Some(block_size) = args.block_size {
        config.render.block_size = block_size;
    }

    let mut synth: Synth<RENDER_VOICES> = config
        .build_synth()
        .context("building synth from configuration")?;

    let render = config.render;
    let sr = render.sample_rate as f32;
    let hold_samples = (args.duration * sr) as usize;
    let total_samples = hold_samples + (args.release * sr) as usize;

    tracing::info!(
        sample_rate = render.sample_rate,
        block_size = render.block_size,
        channels = render.channels,
        notes = ?notes,
        "rendering"
    );

    println!("Rendering {} note(s) to {}", notes.len(), args.output.display());
    println!(
        "  Notes: {}",
        notes
            .iter()
            .map(|&n| format!("{n} ({:.1} Hz)", midi_to_freq(n)))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Hold: {:.2}s, release tail: {:.2}s at {} Hz",
        args.duration, args.release, render.sample_rate
    );

    let spec = WavSpec {
        channels: render.channels,
        sample_rate: render.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;

    for &note in &notes {
        synth.note_on(note, args.velocity, midi_to_freq(note));
    }

    let mut buffers = vec![vec![0.0f32; render.block_size]; usize::from(render.channels)];
    let mut released = hold_samples == 0;
    if released {
        release_all(&mut synth, &notes);
    }
    let mut peak = 0.0f32;
    let mut sum_squares = 0.0f64;
    let mut position = 0;

    while position < total_samples {
        // Blocks end on the release point so note-offs land on the exact sample
        let limit = if released { total_samples } else { hold_samples };
        let num = render.block_size.min(limit - position);

        for buffer in &mut buffers {
            buffer.fill(0.0);
        }
        let mut channels: Vec<&mut [f32]> = buffers.iter_mut().map(Vec::as_mut_slice).collect();
        synth.render_block(&mut channels, 0, num);

        for i in 0..num {
            for buffer in &buffers {
                let sample = buffer[i];
                peak = peak.max(sample.abs());
                writer.write_sample(sample)?;
            }
            sum_squares += f64::from(buffers[0][i]) * f64::from(buffers[0][i]);
        }

        position += num;
        if !released && position >= hold_samples {
            release_all(&mut synth, &notes);
            released = true;
        }
    }

    writer
        .finalize()
        .with_context(|| format!("finalizing {}", args.output.display()))?;

    let rms = if total_samples == 0 {
        0.0
    } else {
        (sum_squares / total_samples as f64).sqrt() as f32
    };
    println!(
        "Wrote {} samples ({:.2}s, {} ch) to {}",
        total_samples,
        total_samples as f32 / sr,
        render.channels,
        args.output.display()
    );
    println!("  RMS: {:.4} ({:.1} dBFS)", rms, to_dbfs(rms));
    println!("  Peak: {:.4} ({:.1} dBFS)", peak, to_dbfs(peak));
    tracing::info!(path = %args.output.display(), rms, peak, "render finished");

    Ok(())
}

fn release_all<const N: usize>(synth: &mut Synth<N>, notes: &[u8]) {
    for &note in notes {
        synth.note_off(note);
    }
}

fn to_dbfs(level: f32) -> f32 {
    if level > 0.0 {
        20.0 * level.log10()
    } else {
        f32::NEG_INFINITY
    }
}
