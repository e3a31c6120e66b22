//! Morphwave CLI - offline rendering and inspection for the morphwave synth.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "morphwave")]
#[command(author, version, about = "Morphwave wavetable synth CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render held notes to a WAV file
    Render(commands::render::RenderArgs),

    /// List every synth parameter with its range and default
    Params(commands::params::ParamsArgs),

    /// Print, save or check an engine configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
