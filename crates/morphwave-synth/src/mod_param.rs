//! Smoothed, modulatable voice parameters.
//!
//! Every parameter a voice reads per sample is a [`ModulatableParameter`]:
//! a linearly smoothed base value plus at most one LFO and one envelope
//! source. Sources are tagged indices ([`ModSource`]) resolved against the
//! voice's [`ModValues`] each sample, so routing never holds references.
//!
//! How the sources combine depends on the parameter's [`ParamKind`]:
//!
//! | Kind | Combination |
//! |------|-------------|
//! | `Gain` | `(base + lfo·s_l) · (env·s_e)` |
//! | `Frequency` | `base · (1 + offset) · (1 + lfo·s_l) · (1 + env·s_e)`, floored at [`MIN_FREQUENCY_HZ`] |
//! | `WavePosition` | `base + lfo·s_l + env·s_e`, wrapped into `[0, 1]` |
//!
//! A factor only applies when its source is assigned.

use morphwave_core::LinearSmoothedParam;

/// Smoothing ramp for base-value changes, in milliseconds.
pub const SMOOTHING_TIME_MS: f32 = 10.0;

/// Lowest frequency a `Frequency` parameter can produce.
pub const MIN_FREQUENCY_HZ: f32 = 0.001;

/// Number of LFOs per voice.
pub const NUM_LFOS: usize = 3;

/// Number of envelopes per voice.
pub const NUM_ENVELOPES: usize = 3;

/// Which family of modulator an index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// One of the voice LFOs
    Lfo,
    /// One of the voice envelopes
    Envelope,
}

/// A resolved modulation source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModSource {
    /// No modulation
    #[default]
    None,
    /// LFO by zero-based index
    Lfo(usize),
    /// Envelope by zero-based index
    Envelope(usize),
}

impl ModSource {
    /// Resolve a routing index: `1..=3` selects a source, anything else is `None`.
    ///
    /// ```rust
    /// use morphwave_synth::{ModSource, SourceKind};
    ///
    /// assert_eq!(ModSource::from_index(SourceKind::Lfo, 2), ModSource::Lfo(1));
    /// assert_eq!(ModSource::from_index(SourceKind::Envelope, 1), ModSource::Envelope(0));
    /// assert_eq!(ModSource::from_index(SourceKind::Lfo, 0), ModSource::None);
    /// assert_eq!(ModSource::from_index(SourceKind::Lfo, 7), ModSource::None);
    /// ```
    pub fn from_index(kind: SourceKind, index: i32) -> Self {
        match (kind, index) {
            (SourceKind::Lfo, 1..=3) => ModSource::Lfo(index as usize - 1),
            (SourceKind::Envelope, 1..=3) => ModSource::Envelope(index as usize - 1),
            _ => ModSource::None,
        }
    }

    /// Current value of this source, or `None` when unassigned.
    #[inline]
    pub fn value(self, mods: &ModValues) -> Option<f32> {
        match self {
            ModSource::None => None,
            ModSource::Lfo(i) => mods.lfo.get(i).copied(),
            ModSource::Envelope(i) => mods.env.get(i).copied(),
        }
    }
}

/// Per-sample modulator outputs of one voice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModValues {
    /// Latest LFO outputs
    pub lfo: [f32; NUM_LFOS],
    /// Latest envelope levels
    pub env: [f32; NUM_ENVELOPES],
}

/// How a parameter combines its modulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// LFO adds, envelope scales
    Gain,
    /// Relative scaling around the base, never below `MIN_FREQUENCY_HZ`
    Frequency,
    /// Everything adds, result wraps into `[0, 1]`
    WavePosition,
}

/// A smoothed scalar with optional LFO and envelope modulation.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{ModValues, ModulatableParameter, ParamKind, SourceKind};
///
/// let mut cutoff = ModulatableParameter::new(ParamKind::Frequency, 1000.0, 48000.0);
/// cutoff.assign(SourceKind::Envelope, 1);
/// cutoff.set_env_scale(2.0);
///
/// let mut mods = ModValues::default();
/// mods.env[0] = 0.5;
/// // 1000 · (1 + 0.5·2)
/// assert_eq!(cutoff.tick(&mods), 2000.0);
/// ```
#[derive(Debug, Clone)]
pub struct ModulatableParameter {
    kind: ParamKind,
    base: LinearSmoothedParam,
    offset: f32,
    lfo: ModSource,
    lfo_scale: f32,
    env: ModSource,
    env_scale: f32,
    current: f32,
}

impl ModulatableParameter {
    /// Create a parameter resting at `initial` with no sources assigned.
    pub fn new(kind: ParamKind, initial: f32, sample_rate: f32) -> Self {
        Self {
            kind,
            base: LinearSmoothedParam::with_config(initial, sample_rate, SMOOTHING_TIME_MS),
            offset: 0.0,
            lfo: ModSource::None,
            lfo_scale: 1.0,
            env: ModSource::None,
            env_scale: 1.0,
            current: initial,
        }
    }

    /// Advance smoothing by one sample and return the modulated value.
    #[inline]
    pub fn tick(&mut self, mods: &ModValues) -> f32 {
        let base = self.base.advance();
        let lfo = self.lfo.value(mods);
        let env = self.env.value(mods);

        self.current = match self.kind {
            ParamKind::Gain => {
                let mut value = base;
                if let Some(l) = lfo {
                    value += l * self.lfo_scale;
                }
                if let Some(e) = env {
                    value *= e * self.env_scale;
                }
                value
            }
            ParamKind::Frequency => {
                let mut value = base * (1.0 + self.offset);
                if let Some(l) = lfo {
                    value *= 1.0 + l * self.lfo_scale;
                }
                if let Some(e) = env {
                    value *= 1.0 + e * self.env_scale;
                }
                value.max(MIN_FREQUENCY_HZ)
            }
            ParamKind::WavePosition => {
                let value = base
                    + lfo.map_or(0.0, |l| l * self.lfo_scale)
                    + env.map_or(0.0, |e| e * self.env_scale);
                wrap_unit(value)
            }
        };
        self.current
    }

    /// The value returned by the last [`tick`](Self::tick).
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Semantic kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Ramp the base value to `value` over the smoothing time.
    pub fn set_value(&mut self, value: f32) {
        self.base.set_target(value);
    }

    /// Jump the base value to `value`.
    pub fn set_immediate(&mut self, value: f32) {
        self.base.set_immediate(value);
    }

    /// Base value the smoother is heading to.
    pub fn target(&self) -> f32 {
        self.base.target()
    }

    /// Relative offset for `Frequency` parameters (`0.0` = none, `1.0` = double).
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Scale applied to the LFO source.
    pub fn set_lfo_scale(&mut self, scale: f32) {
        self.lfo_scale = scale;
    }

    /// Scale applied to the envelope source.
    pub fn set_env_scale(&mut self, scale: f32) {
        self.env_scale = scale;
    }

    /// Route source `index` of `kind` to this parameter (`0` clears it).
    pub fn assign(&mut self, kind: SourceKind, index: i32) {
        let source = ModSource::from_index(kind, index);
        match kind {
            SourceKind::Lfo => self.lfo = source,
            SourceKind::Envelope => self.env = source,
        }
    }

    /// Currently assigned LFO source.
    pub fn lfo_source(&self) -> ModSource {
        self.lfo
    }

    /// Currently assigned envelope source.
    pub fn env_source(&self) -> ModSource {
        self.env
    }

    /// Update the smoothing ramp for a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.base.set_sample_rate(sample_rate);
    }
}

/// Wrap into `[0, 1]`, leaving values already in range untouched.
#[inline]
fn wrap_unit(value: f32) -> f32 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        value - libm::floorf(value)
    }
}
