//! Engine configuration for the morphwave synth.
//!
//! Loads and saves [`EngineConfig`] files (render settings, procedural
//! wave bank contents and a full parameter snapshot) as TOML, validates
//! them against the engine's published parameter ranges, and builds a
//! ready-to-render [`Synth`](morphwave_synth::Synth).
//!
//! # Features
//!
//! - **Engine configs**: TOML load/save with every field defaulted
//! - **Validation**: Parameter ranges, render settings, table sets
//! - **Overrides**: `path=value` assignments with unit suffixes
//!
//! # Example
//!
//! ```rust,no_run
//! use morphwave_config::{EngineConfig, parse_assignment};
//!
//! let mut config = EngineConfig::load("pad.toml").unwrap();
//! let (path, value) = parse_assignment("filter.freq=1800Hz").unwrap();
//! config.set_param(&path, value).unwrap();
//!
//! let mut synth: morphwave_synth::Synth<8> = config.build_synth().unwrap();
//! config.save("renders/pad-bright.toml").unwrap();
//! # let _ = &mut synth;
//! ```

mod engine;
mod error;

/// Parameter, render and table validation.
pub mod validation;

pub use engine::{EngineConfig, RenderSettings, TableSets};
pub use error::ConfigError;
pub use validation::{
    ParamValidator, ValidationError, ValidationResult, parse_assignment, parse_param_value,
    validate_render, validate_tables,
};
