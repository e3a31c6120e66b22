//! Configuration validation.
//!
//! Parameter values are checked against the ranges published by
//! [`morphwave_synth::param_specs`]; render settings and table sets against
//! what the engine can run.
//!
//! # Example
//!
//! ```rust
//! use morphwave_config::{ParamValidator, parse_assignment};
//!
//! let validator = ParamValidator::new();
//! validator.validate_value("filter.res", 0.3).expect("in range");
//! assert!(validator.validate_value("filter.res", 3.0).is_err());
//!
//! let (path, value) = parse_assignment("env1.attack=20ms").unwrap();
//! assert_eq!(path, "env1.attack");
//! assert!((value - 0.02).abs() < 1e-6);
//! ```

use std::collections::HashMap;

use morphwave_synth::{MAX_TABLES, ParamSpec, SynthParams, param_specs};
use thiserror::Error;

use crate::engine::{RenderSettings, TableSets};

/// Lowest accepted render sample rate.
pub const MIN_SAMPLE_RATE: u32 = 8_000;
/// Highest accepted render sample rate.
pub const MAX_SAMPLE_RATE: u32 = 384_000;
/// Largest accepted render block.
pub const MAX_BLOCK_SIZE: usize = 8192;
/// Largest accepted output channel count.
pub const MAX_CHANNELS: u16 = 8;
/// Largest accepted master gain.
pub const MAX_MASTER_GAIN: f32 = 4.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter path not known to the engine.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Value or entry that cannot be interpreted.
    #[error("invalid format for '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter or config key.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collapse a list of findings into one result.
pub(crate) fn collect_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Parameter range lookup built from the engine's parameter table.
#[derive(Debug, Clone)]
pub struct ParamValidator {
    specs: HashMap<String, ParamSpec>,
}

impl Default for ParamValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamValidator {
    /// Index every engine parameter by path.
    pub fn new() -> Self {
        let specs = param_specs()
            .into_iter()
            .map(|spec| (spec.path.clone(), spec))
            .collect();
        Self { specs }
    }

    /// Range and default of `path`.
    pub fn spec(&self, path: &str) -> Option<&ParamSpec> {
        self.specs.get(path)
    }

    /// Check that `path` exists and `value` lies in its range.
    pub fn validate_value(&self, path: &str, value: f32) -> ValidationResult<()> {
        let spec = self
            .spec(path)
            .ok_or_else(|| ValidationError::UnknownParameter(path.to_string()))?;
        if spec.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                param: path.to_string(),
                value,
                min: spec.min,
                max: spec.max,
            })
        }
    }

    /// Check every value of a snapshot, reporting all failures at once.
    pub fn validate_params(&self, params: &SynthParams) -> ValidationResult<()> {
        let mut paths: Vec<&String> = self.specs.keys().collect();
        paths.sort();

        let errors = paths
            .into_iter()
            .filter_map(|path| {
                let value = params
                    .get(path)
                    .map_err(|_| ValidationError::UnknownParameter(path.clone()))
                    .and_then(|value| self.validate_value(path, value));
                value.err()
            })
            .collect();
        collect_errors(errors)
    }
}

/// Check render settings against what the engine and WAV writer accept.
pub fn validate_render(render: &RenderSettings) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&render.sample_rate) {
        errors.push(ValidationError::OutOfRange {
            param: "render.sample_rate".into(),
            value: render.sample_rate as f32,
            min: MIN_SAMPLE_RATE as f32,
            max: MAX_SAMPLE_RATE as f32,
        });
    }
    if !(1..=MAX_BLOCK_SIZE).contains(&render.block_size) {
        errors.push(ValidationError::OutOfRange {
            param: "render.block_size".into(),
            value: render.block_size as f32,
            min: 1.0,
            max: MAX_BLOCK_SIZE as f32,
        });
    }
    if !(1..=MAX_CHANNELS).contains(&render.channels) {
        errors.push(ValidationError::OutOfRange {
            param: "render.channels".into(),
            value: f32::from(render.channels),
            min: 1.0,
            max: f32::from(MAX_CHANNELS),
        });
    }
    if !(0.0..=MAX_MASTER_GAIN).contains(&render.master_gain) {
        errors.push(ValidationError::OutOfRange {
            param: "render.master_gain".into(),
            value: render.master_gain,
            min: 0.0,
            max: MAX_MASTER_GAIN,
        });
    }

    collect_errors(errors)
}

/// Check that every table target names between one and [`MAX_TABLES`] shapes.
pub fn validate_tables(tables: &TableSets) -> ValidationResult<()> {
    let errors = tables
        .iter()
        .filter_map(|(target, shapes)| {
            let reason = if shapes.is_empty() {
                "at least one shape is required".to_string()
            } else if shapes.len() > MAX_TABLES {
                format!("{} shapes exceed the limit of {MAX_TABLES}", shapes.len())
            } else {
                return None;
            };
            Some(ValidationError::InvalidFormat {
                param: format!("tables.{target}"),
                reason,
            })
        })
        .collect();
    collect_errors(errors)
}

/// Parse a parameter value from a string.
///
/// Supports:
/// - Plain numbers: "0.5", "400", "-2"
/// - Hertz: "400Hz"
/// - Milliseconds, converted to seconds: "20ms"
/// - Percentages, converted to 0-1: "50%"
pub fn parse_param_value(path: &str, value_str: &str) -> ValidationResult<f32> {
    let s = value_str.trim();
    let (number, divisor) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1000.0)
    } else if let Some(v) = s.strip_suffix("Hz").or_else(|| s.strip_suffix("hz")) {
        (v, 1.0)
    } else if let Some(v) = s.strip_suffix('%') {
        (v, 100.0)
    } else {
        (s, 1.0)
    };

    let value = number
        .trim()
        .parse::<f32>()
        .map_err(|_| ValidationError::InvalidFormat {
            param: path.to_string(),
            reason: format!("cannot parse '{}' as number", number.trim()),
        })?;
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            param: path.to_string(),
            reason: format!("'{s}' is not a finite number"),
        });
    }
    Ok(value / divisor)
}

/// Split a `path=value` override into its path and parsed value.
pub fn parse_assignment(assignment: &str) -> ValidationResult<(String, f32)> {
    let (path, value) = assignment
        .split_once('=')
        .ok_or_else(|| ValidationError::InvalidFormat {
            param: assignment.to_string(),
            reason: "expected path=value".into(),
        })?;
    let path = path.trim();
    if path.is_empty() {
        return Err(ValidationError::InvalidFormat {
            param: assignment.to_string(),
            reason: "empty parameter path".into(),
        });
    }
    let value = parse_param_value(path, value)?;
    Ok((path.to_string(), value))
}
