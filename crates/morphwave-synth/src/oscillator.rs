//! Wavetable oscillators.
//!
//! [`WavetableOscillator`] reads a [`WaveTableVector`] at a phase it tracks
//! in table-sample units. Frequency, wave position and gain are all
//! [`ModulatableParameter`]s, ticked once per output sample.
//!
//! [`Lfo`] is the same oscillator running at sub-audio rates, with its
//! frequency exposed as *rate* and its gain as *depth*.

use libm::floorf;

use crate::mod_param::{ModValues, ModulatableParameter, ParamKind};
use crate::wavetable::{TABLE_SIZE, WaveTableVector};

/// Euclidean remainder for f32, compatible with no_std.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 { r + b } else { r }
}

/// Default oscillator gain.
pub const DEFAULT_OSC_GAIN: f32 = 0.5;

/// Default LFO rate in Hz.
pub const DEFAULT_LFO_RATE: f32 = 10.0;

/// Default LFO depth.
pub const DEFAULT_LFO_DEPTH: f32 = 0.5;

/// Wavetable oscillator with modulatable frequency, wave position and gain.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{BasicShape, ModValues, WaveTableVector, WavetableOscillator};
///
/// let table = WaveTableVector::from_tables(vec![BasicShape::Saw.table()]);
/// let mut osc = WavetableOscillator::new(48000.0);
/// osc.note_on(440.0);
///
/// let mods = ModValues::default();
/// // First read is at phase 0 of the saw, scaled by the default gain
/// assert_eq!(osc.next_sample(&table, &mods), -0.5);
/// ```
#[derive(Debug, Clone)]
pub struct WavetableOscillator {
    /// Read position in table samples, `[0, TABLE_SIZE)`
    phase: f32,
    sample_rate: f32,
    frequency: ModulatableParameter,
    wave_position: ModulatableParameter,
    gain: ModulatableParameter,
}

impl Default for WavetableOscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl WavetableOscillator {
    /// Create an oscillator at 440 Hz with default gain.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_defaults(440.0, DEFAULT_OSC_GAIN, sample_rate)
    }

    /// Create an oscillator with explicit starting frequency and gain.
    pub fn with_defaults(frequency: f32, gain: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
            frequency: ModulatableParameter::new(ParamKind::Frequency, frequency, sample_rate),
            wave_position: ModulatableParameter::new(ParamKind::WavePosition, 0.0, sample_rate),
            gain: ModulatableParameter::new(ParamKind::Gain, gain, sample_rate),
        }
    }

    /// Produce one sample from `table` and advance the phase.
    ///
    /// The read happens at the current phase; the increment
    /// `freq · TABLE_SIZE / sample_rate` is applied afterwards.
    #[inline]
    pub fn next_sample(&mut self, table: &WaveTableVector, mods: &ModValues) -> f32 {
        let freq = self.frequency.tick(mods);
        let span = table.len().saturating_sub(1) as f32;
        let position = self.wave_position.tick(mods) * span;

        let sample = table.sample_at(self.phase, position);

        let increment = freq * TABLE_SIZE as f32 / self.sample_rate;
        self.phase = rem_euclid_f32(self.phase + increment, TABLE_SIZE as f32);

        sample * self.gain.tick(mods)
    }

    /// Jump to a new note frequency without gliding.
    pub fn note_on(&mut self, frequency: f32) {
        self.frequency.set_immediate(frequency);
    }

    /// Glide to `frequency` over the smoothing time.
    pub fn pitch_bend(&mut self, frequency: f32) {
        self.frequency.set_value(frequency);
    }

    /// Restart the cycle at phase 0.
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    /// Current read position in table samples.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Frequency parameter.
    pub fn frequency(&self) -> &ModulatableParameter {
        &self.frequency
    }

    /// Frequency parameter, mutable.
    pub fn frequency_mut(&mut self) -> &mut ModulatableParameter {
        &mut self.frequency
    }

    /// Normalized wave position parameter.
    pub fn wave_position(&self) -> &ModulatableParameter {
        &self.wave_position
    }

    /// Normalized wave position parameter, mutable.
    pub fn wave_position_mut(&mut self) -> &mut ModulatableParameter {
        &mut self.wave_position
    }

    /// Gain parameter.
    pub fn gain(&self) -> &ModulatableParameter {
        &self.gain
    }

    /// Gain parameter, mutable.
    pub fn gain_mut(&mut self) -> &mut ModulatableParameter {
        &mut self.gain
    }

    /// Set sample rate for all smoothers and the phase increment.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.frequency.set_sample_rate(sample_rate);
        self.wave_position.set_sample_rate(sample_rate);
        self.gain.set_sample_rate(sample_rate);
    }
}

/// LFO parameters that accept modulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LfoParam {
    /// Rate in Hz
    Rate,
    /// Output depth
    Depth,
}

/// Low-frequency oscillator reading its own wavetable slot.
///
/// Output is `table · depth`, so a unit-amplitude table swings `±depth`.
#[derive(Debug, Clone)]
pub struct Lfo {
    osc: WavetableOscillator,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Lfo {
    /// Create an LFO at the default rate and depth.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            osc: WavetableOscillator::with_defaults(
                DEFAULT_LFO_RATE,
                DEFAULT_LFO_DEPTH,
                sample_rate,
            ),
        }
    }

    /// Next LFO value. A missing table yields `0.0` and holds the phase.
    #[inline]
    pub fn tick(&mut self, table: Option<&WaveTableVector>, mods: &ModValues) -> f32 {
        match table {
            Some(table) => self.osc.next_sample(table, mods),
            None => 0.0,
        }
    }

    /// Rate or depth parameter.
    pub fn param(&self, param: LfoParam) -> &ModulatableParameter {
        match param {
            LfoParam::Rate => self.osc.frequency(),
            LfoParam::Depth => self.osc.gain(),
        }
    }

    /// Rate or depth parameter, mutable.
    pub fn param_mut(&mut self, param: LfoParam) -> &mut ModulatableParameter {
        match param {
            LfoParam::Rate => self.osc.frequency_mut(),
            LfoParam::Depth => self.osc.gain_mut(),
        }
    }

    /// Restart the cycle.
    pub fn reset_phase(&mut self) {
        self.osc.reset_phase();
    }

    /// Set sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc.set_sample_rate(sample_rate);
    }
}
