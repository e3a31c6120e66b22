//! Engine configuration command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use morphwave_config::EngineConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default configuration here instead of printing it
    #[arg(short, long, value_name = "FILE", conflicts_with = "check")]
    output: Option<PathBuf>,

    /// Load and validate an existing configuration
    #[arg(long, value_name = "FILE")]
    check: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    if let Some(path) = args.check {
        let config = EngineConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        println!(
            "{}: ok ({} Hz, block {}, {} ch)",
            path.display(),
            config.render.sample_rate,
            config.render.block_size,
            config.render.channels
        );
        return Ok(());
    }

    let config = EngineConfig::default();
    match args.output {
        Some(path) => {
            config
                .save(&path)
                .with_context(|| format!("saving config {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            println!("Wrote default configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
