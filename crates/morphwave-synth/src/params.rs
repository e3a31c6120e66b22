//! Control-rate parameter snapshot.
//!
//! [`SynthParams`] carries every value the host can change, grouped by
//! module. The host fills one in, then hands it to
//! [`Synth::update`](crate::Synth::update) once per block. Every leaf is also
//! reachable through a dotted path:
//!
//! | Path | Range |
//! |------|-------|
//! | `env1.attack` … `env3.release` | seconds, 0–3 (sustain 0–1) |
//! | `lfo1.rate`, `lfo1.depth` | 0–20 Hz, 0–1 |
//! | `osc1.gain`, `osc1.wave`, `osc1.pitch` | 0–1, 0–1, −1–1 |
//! | `filter.freq`, `filter.res`, `filter.drive` | 100–15000 Hz, 0–1, 1–10 |
//! | `filter.mode` | 0 = HPF, 1 = LPF, 2 = bypass |
//! | `<target>.lfo_source`, `<target>.env_source` | 0 = none, 1–3 |
//! | `<target>.lfo_scale`, `<target>.env_scale` | −1–1 (pitch and filter −4–4) |
//!
//! LFO rate and depth take envelope sources only, so they have no
//! `lfo_source` or `lfo_scale` paths.

use crate::envelope::EnvelopeParams;
use crate::error::SynthError;
use crate::filter::DEFAULT_CUTOFF_HZ;
use crate::mod_param::{NUM_ENVELOPES, NUM_LFOS};
use crate::oscillator::{DEFAULT_LFO_DEPTH, DEFAULT_LFO_RATE, DEFAULT_OSC_GAIN};

/// Number of melodic oscillators per voice.
pub const NUM_OSCILLATORS: usize = 2;

/// A modulatable value with its routing.
///
/// Source indices follow the routing convention: `0` is none, `1..=3` picks
/// a source, anything else is treated as none.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModTarget {
    /// Base value
    pub value: f32,
    /// LFO routing index
    pub lfo_source: i32,
    /// LFO modulation scale
    pub lfo_scale: f32,
    /// Envelope routing index
    pub env_source: i32,
    /// Envelope modulation scale
    pub env_scale: f32,
}

impl Default for ModTarget {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ModTarget {
    /// Unrouted target at `value` with unit scales.
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            lfo_source: 0,
            lfo_scale: 1.0,
            env_source: 0,
            env_scale: 1.0,
        }
    }

    /// Route LFO `index` at `scale`.
    #[must_use]
    pub const fn with_lfo(mut self, index: i32, scale: f32) -> Self {
        self.lfo_source = index;
        self.lfo_scale = scale;
        self
    }

    /// Route envelope `index` at `scale`.
    #[must_use]
    pub const fn with_env(mut self, index: i32, scale: f32) -> Self {
        self.env_source = index;
        self.env_scale = scale;
        self
    }
}

/// Rate and depth of one LFO.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LfoParams {
    /// Rate in Hz
    pub rate: ModTarget,
    /// Output depth
    pub depth: ModTarget,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            rate: ModTarget::new(DEFAULT_LFO_RATE),
            depth: ModTarget::new(DEFAULT_LFO_DEPTH),
        }
    }
}

/// Gain, wave position and pitch offset of one melodic oscillator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OscillatorParams {
    /// Output gain
    pub gain: ModTarget,
    /// Normalized wave position across the table vector
    pub wave: ModTarget,
    /// Relative pitch offset (`1.0` = one octave up)
    pub pitch: ModTarget,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            gain: ModTarget::new(DEFAULT_OSC_GAIN),
            wave: ModTarget::new(0.0),
            pitch: ModTarget::new(0.0),
        }
    }
}

/// Voice filter settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterParams {
    /// Mode index: 0 = high-pass, 1 = low-pass, 2 = bypass
    pub mode: i32,
    /// Cutoff in Hz
    pub freq: ModTarget,
    /// Normalized resonance
    pub res: ModTarget,
    /// Drive, `1.0` = clean
    pub drive: ModTarget,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            mode: 1,
            freq: ModTarget::new(DEFAULT_CUTOFF_HZ),
            res: ModTarget::new(0.0),
            drive: ModTarget::new(1.0),
        }
    }
}

/// Every control-rate engine setting.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::SynthParams;
///
/// let mut params = SynthParams::default();
/// params.set("filter.freq", 2000.0).unwrap();
/// params.set("filter.freq.env_source", 2.0).unwrap();
/// assert_eq!(params.filter.freq.value, 2000.0);
/// assert_eq!(params.get("filter.freq.env_source"), Ok(2.0));
/// assert!(params.set("filter.q", 1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynthParams {
    /// Envelope 1 (amplitude) through 3
    pub envelopes: [EnvelopeParams; NUM_ENVELOPES],
    /// LFO 1 through 3
    pub lfos: [LfoParams; NUM_LFOS],
    /// Oscillator 1 and 2
    pub oscillators: [OscillatorParams; NUM_OSCILLATORS],
    /// Voice filter
    pub filter: FilterParams,
}

/// A parameter that accepts modulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModDestination {
    /// Oscillator 1 gain
    Osc1Gain,
    /// Oscillator 1 wave position
    Osc1Wave,
    /// Oscillator 1 pitch
    Osc1Pitch,
    /// Oscillator 2 gain
    Osc2Gain,
    /// Oscillator 2 wave position
    Osc2Wave,
    /// Oscillator 2 pitch
    Osc2Pitch,
    /// LFO 1 rate
    Lfo1Rate,
    /// LFO 1 depth
    Lfo1Depth,
    /// LFO 2 rate
    Lfo2Rate,
    /// LFO 2 depth
    Lfo2Depth,
    /// LFO 3 rate
    Lfo3Rate,
    /// LFO 3 depth
    Lfo3Depth,
    /// Filter cutoff
    FilterFreq,
    /// Filter resonance
    FilterRes,
    /// Filter drive
    FilterDrive,
}

impl ModDestination {
    /// Every destination in path order.
    pub const ALL: [ModDestination; 15] = [
        ModDestination::Osc1Gain,
        ModDestination::Osc1Wave,
        ModDestination::Osc1Pitch,
        ModDestination::Osc2Gain,
        ModDestination::Osc2Wave,
        ModDestination::Osc2Pitch,
        ModDestination::Lfo1Rate,
        ModDestination::Lfo1Depth,
        ModDestination::Lfo2Rate,
        ModDestination::Lfo2Depth,
        ModDestination::Lfo3Rate,
        ModDestination::Lfo3Depth,
        ModDestination::FilterFreq,
        ModDestination::FilterRes,
        ModDestination::FilterDrive,
    ];

    /// Dotted path of the base value.
    pub fn path(self) -> &'static str {
        match self {
            ModDestination::Osc1Gain => "osc1.gain",
            ModDestination::Osc1Wave => "osc1.wave",
            ModDestination::Osc1Pitch => "osc1.pitch",
            ModDestination::Osc2Gain => "osc2.gain",
            ModDestination::Osc2Wave => "osc2.wave",
            ModDestination::Osc2Pitch => "osc2.pitch",
            ModDestination::Lfo1Rate => "lfo1.rate",
            ModDestination::Lfo1Depth => "lfo1.depth",
            ModDestination::Lfo2Rate => "lfo2.rate",
            ModDestination::Lfo2Depth => "lfo2.depth",
            ModDestination::Lfo3Rate => "lfo3.rate",
            ModDestination::Lfo3Depth => "lfo3.depth",
            ModDestination::FilterFreq => "filter.freq",
            ModDestination::FilterRes => "filter.res",
            ModDestination::FilterDrive => "filter.drive",
        }
    }

    /// Whether an LFO may drive this destination.
    pub fn accepts_lfo(self) -> bool {
        !matches!(
            self,
            ModDestination::Lfo1Rate
                | ModDestination::Lfo1Depth
                | ModDestination::Lfo2Rate
                | ModDestination::Lfo2Depth
                | ModDestination::Lfo3Rate
                | ModDestination::Lfo3Depth
        )
    }

    /// Valid range of the base value.
    pub fn value_range(self) -> (f32, f32) {
        match self {
            ModDestination::Osc1Gain
            | ModDestination::Osc2Gain
            | ModDestination::Osc1Wave
            | ModDestination::Osc2Wave
            | ModDestination::Lfo1Depth
            | ModDestination::Lfo2Depth
            | ModDestination::Lfo3Depth
            | ModDestination::FilterRes => (0.0, 1.0),
            ModDestination::Osc1Pitch | ModDestination::Osc2Pitch => (-1.0, 1.0),
            ModDestination::Lfo1Rate | ModDestination::Lfo2Rate | ModDestination::Lfo3Rate => {
                (0.0, 20.0)
            }
            ModDestination::FilterFreq => (100.0, 15_000.0),
            ModDestination::FilterDrive => (1.0, 10.0),
        }
    }

    /// Valid range of the modulation scales.
    pub fn scale_range(self) -> (f32, f32) {
        match self {
            ModDestination::Osc1Pitch
            | ModDestination::Osc2Pitch
            | ModDestination::FilterFreq
            | ModDestination::FilterRes
            | ModDestination::FilterDrive => (-4.0, 4.0),
            _ => (-1.0, 1.0),
        }
    }

    fn from_parts(group: &str, name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dest| dest.path().split_once('.') == Some((group, name)))
    }
}

/// Range and default of one parameter path.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    /// Dotted path
    pub path: String,
    /// Smallest accepted value
    pub min: f32,
    /// Largest accepted value
    pub max: f32,
    /// Value in `SynthParams::default()`
    pub default: f32,
}

impl ParamSpec {
    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

enum Leaf<'a> {
    Float(&'a mut f32),
    Index(&'a mut i32),
}

impl SynthParams {
    /// Routing and value for a modulation destination.
    pub fn target(&self, dest: ModDestination) -> &ModTarget {
        match dest {
            ModDestination::Osc1Gain => &self.oscillators[0].gain,
            ModDestination::Osc1Wave => &self.oscillators[0].wave,
            ModDestination::Osc1Pitch => &self.oscillators[0].pitch,
            ModDestination::Osc2Gain => &self.oscillators[1].gain,
            ModDestination::Osc2Wave => &self.oscillators[1].wave,
            ModDestination::Osc2Pitch => &self.oscillators[1].pitch,
            ModDestination::Lfo1Rate => &self.lfos[0].rate,
            ModDestination::Lfo1Depth => &self.lfos[0].depth,
            ModDestination::Lfo2Rate => &self.lfos[1].rate,
            ModDestination::Lfo2Depth => &self.lfos[1].depth,
            ModDestination::Lfo3Rate => &self.lfos[2].rate,
            ModDestination::Lfo3Depth => &self.lfos[2].depth,
            ModDestination::FilterFreq => &self.filter.freq,
            ModDestination::FilterRes => &self.filter.res,
            ModDestination::FilterDrive => &self.filter.drive,
        }
    }

    /// Mutable routing and value for a modulation destination.
    pub fn target_mut(&mut self, dest: ModDestination) -> &mut ModTarget {
        match dest {
            ModDestination::Osc1Gain => &mut self.oscillators[0].gain,
            ModDestination::Osc1Wave => &mut self.oscillators[0].wave,
            ModDestination::Osc1Pitch => &mut self.oscillators[0].pitch,
            ModDestination::Osc2Gain => &mut self.oscillators[1].gain,
            ModDestination::Osc2Wave => &mut self.oscillators[1].wave,
            ModDestination::Osc2Pitch => &mut self.oscillators[1].pitch,
            ModDestination::Lfo1Rate => &mut self.lfos[0].rate,
            ModDestination::Lfo1Depth => &mut self.lfos[0].depth,
            ModDestination::Lfo2Rate => &mut self.lfos[1].rate,
            ModDestination::Lfo2Depth => &mut self.lfos[1].depth,
            ModDestination::Lfo3Rate => &mut self.lfos[2].rate,
            ModDestination::Lfo3Depth => &mut self.lfos[2].depth,
            ModDestination::FilterFreq => &mut self.filter.freq,
            ModDestination::FilterRes => &mut self.filter.res,
            ModDestination::FilterDrive => &mut self.filter.drive,
        }
    }

    /// Set the leaf at `path`. Source and mode indices are rounded.
    pub fn set(&mut self, path: &str, value: f32) -> Result<(), SynthError> {
        if !value.is_finite() {
            return Err(SynthError::InvalidValue {
                path: path.to_string(),
                value,
            });
        }
        match self.leaf(path) {
            Some(Leaf::Float(slot)) => *slot = value,
            Some(Leaf::Index(slot)) => *slot = libm::roundf(value) as i32,
            None => return Err(SynthError::UnknownParameter(path.to_string())),
        }
        Ok(())
    }

    /// Read the leaf at `path`.
    pub fn get(&self, path: &str) -> Result<f32, SynthError> {
        let mut copy = *self;
        match copy.leaf(path) {
            Some(Leaf::Float(slot)) => Ok(*slot),
            Some(Leaf::Index(slot)) => Ok(*slot as f32),
            None => Err(SynthError::UnknownParameter(path.to_string())),
        }
    }

    fn leaf(&mut self, path: &str) -> Option<Leaf<'_>> {
        let mut parts = path.split('.');
        let group = parts.next()?;
        let name = parts.next()?;
        let field = parts.next();
        if parts.next().is_some() {
            return None;
        }

        if let Some(i) = numbered(group, "env", NUM_ENVELOPES) {
            let env = &mut self.envelopes[i];
            return match (name, field) {
                ("attack", None) => Some(Leaf::Float(&mut env.attack)),
                ("decay", None) => Some(Leaf::Float(&mut env.decay)),
                ("sustain", None) => Some(Leaf::Float(&mut env.sustain)),
                ("release", None) => Some(Leaf::Float(&mut env.release)),
                _ => None,
            };
        }

        if (group, name, field) == ("filter", "mode", None) {
            return Some(Leaf::Index(&mut self.filter.mode));
        }

        let dest = ModDestination::from_parts(group, name)?;
        let accepts_lfo = dest.accepts_lfo();
        let target = self.target_mut(dest);
        match field {
            None => Some(Leaf::Float(&mut target.value)),
            Some("env_source") => Some(Leaf::Index(&mut target.env_source)),
            Some("env_scale") => Some(Leaf::Float(&mut target.env_scale)),
            Some("lfo_source") if accepts_lfo => Some(Leaf::Index(&mut target.lfo_source)),
            Some("lfo_scale") if accepts_lfo => Some(Leaf::Float(&mut target.lfo_scale)),
            _ => None,
        }
    }
}

/// Zero-based index from a one-based name like `env2`.
fn numbered(group: &str, prefix: &str, count: usize) -> Option<usize> {
    let n: usize = group.strip_prefix(prefix)?.parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

/// Every parameter path with its range and default, in a stable order.
pub fn param_specs() -> Vec<ParamSpec> {
    let defaults = SynthParams::default();
    let mut specs = Vec::new();
    let mut push = |path: String, min: f32, max: f32| {
        let default = defaults.get(&path).unwrap_or(min);
        specs.push(ParamSpec {
            path,
            min,
            max,
            default,
        });
    };

    for n in 1..=NUM_ENVELOPES {
        push(format!("env{n}.attack"), 0.0, 3.0);
        push(format!("env{n}.decay"), 0.0, 3.0);
        push(format!("env{n}.sustain"), 0.0, 1.0);
        push(format!("env{n}.release"), 0.0, 3.0);
    }

    let max_source = NUM_LFOS.max(NUM_ENVELOPES) as f32;
    for dest in ModDestination::ALL {
        let path = dest.path();
        let (min, max) = dest.value_range();
        let (scale_min, scale_max) = dest.scale_range();
        push(path.to_string(), min, max);
        if dest.accepts_lfo() {
            push(format!("{path}.lfo_source"), 0.0, max_source);
            push(format!("{path}.lfo_scale"), scale_min, scale_max);
        }
        push(format!("{path}.env_source"), 0.0, max_source);
        push(format!("{path}.env_scale"), scale_min, scale_max);
    }

    push("filter.mode".to_string(), 0.0, 2.0);
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = SynthParams::default();
        assert_eq!(p.envelopes[0], EnvelopeParams::new(0.5, 0.2, 0.8, 0.5));
        assert_eq!(p.lfos[2].rate.value, 10.0);
        assert_eq!(p.lfos[2].depth.value, 0.5);
        assert_eq!(p.oscillators[1].gain.value, 0.5);
        assert_eq!(p.filter.mode, 1);
        assert_eq!(p.filter.freq.value, 400.0);
        assert_eq!(p.filter.drive.value, 1.0);
        assert_eq!(p.filter.res.lfo_scale, 1.0);
        assert_eq!(p.filter.res.env_source, 0);
    }

    #[test]
    fn set_then_get_every_path() {
        let mut params = SynthParams::default();
        for (i, spec) in param_specs().iter().enumerate() {
            let value = if spec.path.ends_with("_source") || spec.path == "filter.mode" {
                spec.max
            } else {
                spec.min + (spec.max - spec.min) * (i % 7) as f32 / 7.0
            };
            params.set(&spec.path, value).unwrap();
            assert_eq!(params.get(&spec.path), Ok(value), "path {}", spec.path);
        }
    }

    #[test]
    fn specs_are_unique_and_cover_defaults() {
        let specs = param_specs();
        let mut paths: Vec<&str> = specs.iter().map(|s| s.path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), specs.len());

        // 12 envelope leaves, 9 oscillator/filter targets with 5 leaves,
        // 6 LFO targets with 3 leaves, filter mode
        assert_eq!(specs.len(), 12 + 9 * 5 + 6 * 3 + 1);

        for spec in &specs {
            assert!(spec.contains(spec.default), "{} default {} outside range", spec.path, spec.default);
        }
    }

    #[test]
    fn index_paths_round() {
        let mut params = SynthParams::default();
        params.set("osc2.wave.lfo_source", 2.6).unwrap();
        assert_eq!(params.oscillators[1].wave.lfo_source, 3);
        params.set("filter.mode", 0.2).unwrap();
        assert_eq!(params.filter.mode, 0);
    }

    #[test]
    fn lfo_targets_have_no_lfo_routing() {
        let mut params = SynthParams::default();
        assert!(params.set("lfo1.rate.env_source", 1.0).is_ok());
        assert_eq!(
            params.set("lfo1.rate.lfo_source", 1.0),
            Err(SynthError::UnknownParameter("lfo1.rate.lfo_source".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_and_non_finite() {
        let mut params = SynthParams::default();
        for path in ["", "env", "env4.attack", "env1.attack.env_source", "osc3.gain", "filter", "filter.mode.x", "osc1.gain.lfo_source.x"] {
            assert!(params.set(path, 1.0).is_err(), "accepted {path:?}");
            assert!(params.get(path).is_err(), "read {path:?}");
        }
        assert!(matches!(
            params.set("osc1.gain", f32::NAN),
            Err(SynthError::InvalidValue { .. })
        ));
        assert_eq!(params, SynthParams::default());
    }

    #[test]
    fn target_lookup_matches_fields() {
        let mut params = SynthParams::default();
        params.target_mut(ModDestination::Osc2Pitch).value = 0.5;
        assert_eq!(params.oscillators[1].pitch.value, 0.5);
        params.lfos[1].depth = ModTarget::new(0.9).with_env(3, -0.5);
        assert_eq!(params.target(ModDestination::Lfo2Depth).env_source, 3);
        assert_eq!(params.get("lfo2.depth.env_scale"), Ok(-0.5));
    }
}
