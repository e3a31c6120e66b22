//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use anyhow::Context;
use morphwave_config::{EngineConfig, parse_assignment};

/// Parse a `path=value` override for clap's `value_parser`.
pub fn parse_override(s: &str) -> Result<(String, f32), String> {
    parse_assignment(s).map_err(|e| e.to_string())
}

/// Parse a comma-separated list of MIDI notes, e.g. "60,64,67".
pub fn parse_notes(s: &str) -> Result<Vec<u8>, String> {
    let notes = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .ok()
                .filter(|&note| note <= 127)
                .ok_or_else(|| format!("invalid MIDI note '{part}' (expected 0-127)"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if notes.is_empty() {
        return Err("no MIDI notes given (expected e.g. \"60,64,67\")".to_string());
    }
    Ok(notes)
}

/// Load a config file, or start from the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
