//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use morphwave_synth::param_specs;

#[derive(Args)]
pub struct ParamsArgs {
    /// Only list paths starting with this prefix (e.g. "osc1" or "filter.freq")
    #[arg(value_name = "PREFIX")]
    prefix: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let specs: Vec<_> = param_specs()
        .into_iter()
        .filter(|spec| {
            args.prefix
                .as_deref()
                .is_none_or(|prefix| spec.path.starts_with(prefix))
        })
        .collect();

    if specs.is_empty() {
        anyhow::bail!(
            "No parameters match '{}'",
            args.prefix.as_deref().unwrap_or_default()
        );
    }

    println!("Synth Parameters");
    println!("================");
    println!();
    println!("  {:28}  {:>10}  {:>10}  {:>10}", "Path", "Min", "Max", "Default");
    println!("  {}", "-".repeat(64));
    for spec in &specs {
        println!(
            "  {:28}  {:>10}  {:>10}  {:>10}",
            spec.path, spec.min, spec.max, spec.default
        );
    }
    println!();
    println!("Source indices: 0 = none, 1-3 = lfo/env number.");
    println!("Set with: morphwave render out.wav --set osc1.wave=0.5");

    Ok(())
}
