//! Linear ADSR envelope generator.
//!
//! Each segment moves at a constant rate derived from its duration:
//!
//! ```text
//! attack_rate  = 1 / (attack · sr)
//! decay_rate   = (1 − sustain) / (decay · sr)
//! release_rate = level_at_note_off / (release · sr)
//! ```
//!
//! A zero duration gives a non-positive rate, which means the segment is
//! skipped. Levels are accumulated in `f64` so a segment of `n` ticks lands
//! on its target after exactly `n` ticks.

/// Slack for segment end checks. Stage times arrive as `f32` seconds, so a
/// segment of `n` samples can fall a few ulps short after `n` ticks.
const LEVEL_EPSILON: f64 = 1e-6;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive, output is zero.
    #[default]
    Idle,
    /// Rising toward 1.0.
    Attack,
    /// Falling from 1.0 toward the sustain level.
    Decay,
    /// Holding the sustain level while the note is held.
    Sustain,
    /// Falling to zero after note off.
    Release,
}

/// Stage settings for one envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvelopeParams {
    /// Attack time in seconds
    pub attack: f32,
    /// Decay time in seconds
    pub decay: f32,
    /// Sustain level, 0.0 to 1.0
    pub sustain: f32,
    /// Release time in seconds
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.5,
            decay: 0.2,
            sustain: 0.8,
            release: 0.5,
        }
    }
}

impl EnvelopeParams {
    /// Create stage settings from times in seconds and a sustain level.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

/// ADSR envelope generator.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_params(EnvelopeParams::new(0.1, 0.2, 0.8, 0.5));
///
/// env.note_on();
/// for _ in 0..4800 {
///     env.tick();
/// }
/// assert_eq!(env.peek(), 1.0);
/// assert_eq!(env.state(), EnvelopeState::Decay);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f64,
    sample_rate: f32,
    params: EnvelopeParams,

    attack_rate: f64,
    decay_rate: f64,
    release_rate: f64,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an idle envelope with default stage settings.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            params: EnvelopeParams::default(),
            attack_rate: 0.0,
            decay_rate: 0.0,
            release_rate: 0.0,
        };
        env.recalculate_rates(false);
        env
    }

    /// Replace all stage settings.
    ///
    /// Sustain is clamped to `[0, 1]`. A running segment whose rate is no
    /// longer positive ends immediately. A release in progress keeps its
    /// rate unless the release time changes, in which case the remaining
    /// level falls over the new time.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        let params = EnvelopeParams {
            sustain: params.sustain.clamp(0.0, 1.0),
            ..params
        };
        if params == self.params {
            return;
        }
        let release_changed = params.release != self.params.release;
        self.params = params;
        self.recalculate_rates(release_changed);
    }

    /// Current stage settings.
    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Set sample rate and re-derive rates.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_rates(true);
    }

    /// Start the attack from the current level.
    pub fn note_on(&mut self) {
        if self.attack_rate > 0.0 {
            self.state = EnvelopeState::Attack;
        } else if self.decay_rate > 0.0 {
            self.level = 1.0;
            self.state = EnvelopeState::Decay;
        } else {
            self.level = f64::from(self.params.sustain);
            self.state = EnvelopeState::Sustain;
        }
    }

    /// Start the release from the current level.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        if self.params.release > 0.0 {
            self.release_rate = self.level / seconds_to_samples(self.params.release, self.sample_rate);
            self.state = EnvelopeState::Release;
        } else {
            self.reset();
        }
    }

    /// Force the envelope to idle at zero.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Whether the envelope is anywhere but idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Current level without advancing.
    #[inline]
    pub fn peek(&self) -> f32 {
        self.level as f32
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => return 0.0,
            EnvelopeState::Attack => {
                self.level += self.attack_rate;
                if self.level >= 1.0 - LEVEL_EPSILON {
                    self.level = 1.0;
                    self.next_state();
                }
            }
            EnvelopeState::Decay => {
                let sustain = f64::from(self.params.sustain);
                self.level -= self.decay_rate;
                if self.level <= sustain + LEVEL_EPSILON {
                    self.level = sustain;
                    self.next_state();
                }
            }
            EnvelopeState::Sustain => {
                self.level = f64::from(self.params.sustain);
            }
            EnvelopeState::Release => {
                self.level -= self.release_rate;
                if self.level <= LEVEL_EPSILON {
                    self.next_state();
                }
            }
        }
        self.level as f32
    }

    fn next_state(&mut self) {
        match self.state {
            EnvelopeState::Attack => {
                self.state = if self.decay_rate > 0.0 {
                    EnvelopeState::Decay
                } else {
                    EnvelopeState::Sustain
                };
            }
            EnvelopeState::Decay => self.state = EnvelopeState::Sustain,
            EnvelopeState::Release => self.reset(),
            EnvelopeState::Idle | EnvelopeState::Sustain => {}
        }
    }

    /// Re-derive segment rates. The release rate depends on the level at
    /// note off, so it is only touched mid-release when `rederive_release` is set.
    fn recalculate_rates(&mut self, rederive_release: bool) {
        let sr = self.sample_rate;
        let p = self.params;
        self.attack_rate = segment_rate(1.0, p.attack, sr);
        self.decay_rate = segment_rate(1.0 - f64::from(p.sustain), p.decay, sr);
        if self.state == EnvelopeState::Release && rederive_release {
            self.release_rate = segment_rate(self.level, p.release, sr);
        }

        let skip = match self.state {
            EnvelopeState::Attack => self.attack_rate <= 0.0,
            EnvelopeState::Decay => {
                self.decay_rate <= 0.0 || self.level <= f64::from(p.sustain)
            }
            EnvelopeState::Release => self.release_rate <= 0.0,
            EnvelopeState::Idle | EnvelopeState::Sustain => false,
        };
        if skip {
            self.next_state();
        }
    }
}

fn seconds_to_samples(seconds: f32, sample_rate: f32) -> f64 {
    f64::from(seconds) * f64::from(sample_rate)
}

/// Per-sample rate covering `distance` in `seconds`, or `-1.0` for an instant segment.
fn segment_rate(distance: f64, seconds: f32, sample_rate: f32) -> f64 {
    if seconds > 0.0 {
        distance / seconds_to_samples(seconds, sample_rate)
    } else {
        -1.0
    }
}
