//! Engine configuration files.
//!
//! An [`EngineConfig`] bundles everything needed to stand up a synth
//! offline: render settings, the procedural table set for every wave bank
//! slot, and a full parameter snapshot. Every field has a default, so a
//! config file only needs the values it changes.
//!
//! # TOML Format
//!
//! ```toml
//! [render]
//! sample_rate = 48000
//! block_size = 512
//! channels = 2
//! master_gain = 0.8
//!
//! [tables]
//! osc1 = ["sine", "triangle", "saw", "square"]
//! osc2 = ["saw"]
//!
//! [params.filter]
//! mode = 1
//!
//! [params.filter.freq]
//! value = 1200.0
//! env_source = 2
//! env_scale = 2.0
//! ```
//!
//! The per-slot arrays (`[[params.envelopes]]`, `[[params.lfos]]`,
//! `[[params.oscillators]]`) must list every slot when present; fields
//! inside each entry still default individually.

use std::path::Path;

use morphwave_synth::{BasicShape, Synth, SynthParams, TableTarget};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{
    ParamValidator, ValidationError, collect_errors, validate_render, validate_tables,
};

/// Offline render settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Samples rendered per engine block
    pub block_size: usize,
    /// Output channel count; every channel carries the same mono mix
    pub channels: u16,
    /// Linear master gain
    pub master_gain: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            channels: 2,
            master_gain: 1.0,
        }
    }
}

/// Procedural shapes loaded into each wave bank slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSets {
    /// Oscillator 1 tables, morphed across by `osc1.wave`
    pub osc1: Vec<BasicShape>,
    /// Oscillator 2 tables
    pub osc2: Vec<BasicShape>,
    /// LFO 1 table
    pub lfo1: Vec<BasicShape>,
    /// LFO 2 table
    pub lfo2: Vec<BasicShape>,
    /// LFO 3 table
    pub lfo3: Vec<BasicShape>,
}

impl Default for TableSets {
    fn default() -> Self {
        Self {
            osc1: BasicShape::ALL.to_vec(),
            osc2: vec![BasicShape::Saw],
            lfo1: vec![BasicShape::Sine],
            lfo2: vec![BasicShape::Sine],
            lfo3: vec![BasicShape::Sine],
        }
    }
}

impl TableSets {
    /// Shapes for one slot.
    pub fn get(&self, target: TableTarget) -> &[BasicShape] {
        match target {
            TableTarget::Osc1 => &self.osc1,
            TableTarget::Osc2 => &self.osc2,
            TableTarget::Lfo1 => &self.lfo1,
            TableTarget::Lfo2 => &self.lfo2,
            TableTarget::Lfo3 => &self.lfo3,
        }
    }

    /// Mutable shapes for one slot.
    pub fn get_mut(&mut self, target: TableTarget) -> &mut Vec<BasicShape> {
        match target {
            TableTarget::Osc1 => &mut self.osc1,
            TableTarget::Osc2 => &mut self.osc2,
            TableTarget::Lfo1 => &mut self.lfo1,
            TableTarget::Lfo2 => &mut self.lfo2,
            TableTarget::Lfo3 => &mut self.lfo3,
        }
    }

    /// Every slot with its shapes, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (TableTarget, &[BasicShape])> {
        TableTarget::ALL
            .into_iter()
            .map(move |target| (target, self.get(target)))
    }
}

/// A complete offline engine setup.
///
/// # Example
///
/// ```rust
/// use morphwave_config::EngineConfig;
///
/// let config = EngineConfig::from_toml(r#"
///     [render]
///     sample_rate = 44100
///
///     [params.filter.freq]
///     value = 2500.0
/// "#).unwrap();
///
/// assert_eq!(config.render.sample_rate, 44100);
/// assert_eq!(config.render.block_size, 512);
/// assert_eq!(config.params.filter.freq.value, 2500.0);
///
/// let synth: morphwave_synth::Synth<8> = config.build_synth().unwrap();
/// assert_eq!(synth.sample_rate(), 44100.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Render settings
    pub render: RenderSettings,
    /// Wave bank contents
    pub tables: TableSets,
    /// Parameter snapshot applied before the first block
    pub params: SynthParams,
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Apply one parameter override by dotted path.
    pub fn set_param(&mut self, path: &str, value: f32) -> Result<(), ConfigError> {
        self.params.set(path, value)?;
        Ok(())
    }

    /// Check render settings, table sets and every parameter range,
    /// reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        for result in [
            validate_render(&self.render),
            validate_tables(&self.tables),
            ParamValidator::new().validate_params(&self.params),
        ] {
            match result {
                Ok(()) => {}
                Err(ValidationError::Multiple(inner)) => errors.extend(inner),
                Err(err) => errors.push(err),
            }
        }
        collect_errors(errors)?;
        Ok(())
    }

    /// Validate, then build a synth with every table slot loaded, the
    /// master gain in place and the parameter snapshot applied.
    pub fn build_synth<const N: usize>(&self) -> Result<Synth<N>, ConfigError> {
        self.validate()?;

        let mut synth = Synth::<N>::new(self.render.sample_rate as f32, self.render.block_size);
        for (target, shapes) in self.tables.iter() {
            synth.bank().load_shapes(target, shapes)?;
        }
        synth.set_master_gain_immediate(self.render.master_gain);
        synth.update(&self.params);
        Ok(synth)
    }
}
