//! Topology-preserving state variable filters.
//!
//! [`StateVariableFilter`] is a 2-pole (12 dB/oct) TPT SVF after Zavalishin,
//! "The Art of VA Filter Design" (2012). The trapezoidal integrators keep the
//! analog prototype's response and stay stable while the cutoff moves, which
//! is what a modulated synth filter needs.
//!
//! [`FourPoleSvf`] cascades two stages for 24 dB/oct and is the filter every
//! morphwave voice runs.
//!
//! # Drive
//!
//! The bandpass integrator state passes through [`fast_tanh`] when drive is
//! non-zero. The pre-gain is divided back out after saturation, so small
//! signals see the linear response and hot signals pick up harmonics.
//!
//! # Coefficients
//!
//! `g = tan(π·fc/sr)` uses [`fast_tan`] below 10 kHz and [`libm::tanf`]
//! above, where the Padé approximation drifts.

use core::f32::consts::PI;
use libm::tanf;

use crate::Effect;
use crate::fast_math::fast_tan;
use crate::math::{fast_tanh, flush_denormal};

/// Which SVF output a filter returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfOutput {
    /// Passes frequencies below the cutoff.
    #[default]
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

/// 2-pole TPT state variable filter.
///
/// ## Parameters
///
/// - `cutoff`: Hz, clamped to 20.0..=sr×0.49 (default 1000.0)
/// - `resonance`: Q, clamped to 0.5..=20.0 (default 0.707)
/// - `drive`: saturation amount, clamped to 0.0..=1.0 (default 0.0)
///
/// # Example
///
/// ```rust
/// use morphwave_core::{Effect, StateVariableFilter, SvfOutput};
///
/// let mut svf = StateVariableFilter::new(48000.0);
/// svf.set_cutoff(800.0);
/// svf.set_resonance(2.0);
/// svf.set_output_type(SvfOutput::Highpass);
///
/// let y = svf.process(0.5);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    ic1eq: f32,
    ic2eq: f32,

    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    drive: f32,
    output_type: SvfOutput,
}

impl Default for StateVariableFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StateVariableFilter {
    /// Create a lowpass SVF at 1 kHz, Q 0.707, no drive.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: 0.707,
            drive: 0.0,
            output_type: SvfOutput::Lowpass,
        };
        svf.update_coefficients();
        svf
    }

    /// Set cutoff frequency in Hz.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff = freq.clamp(20.0, self.sample_rate * 0.49);
        self.update_coefficients();
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance as a Q factor.
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = q.clamp(0.5, 20.0);
        self.update_coefficients();
    }

    /// Current Q.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set saturation amount (0 = linear).
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.clamp(0.0, 1.0);
    }

    /// Current saturation amount.
    pub fn drive(&self) -> f32 {
        self.drive
    }

    /// Select the lowpass or highpass output.
    pub fn set_output_type(&mut self, output_type: SvfOutput) {
        self.output_type = output_type;
    }

    /// Current output selection.
    pub fn output_type(&self) -> SvfOutput {
        self.output_type
    }

    fn update_coefficients(&mut self) {
        let arg = PI * self.cutoff / self.sample_rate;
        self.g = if self.cutoff < 10_000.0 {
            fast_tan(arg)
        } else {
            tanf(arg)
        };
        self.k = 1.0 / self.resonance;
    }

    /// Process one sample, returning `(lowpass, highpass)`.
    pub fn process_pair(&mut self, input: f32) -> (f32, f32) {
        let v3 = input - self.ic2eq;
        let v1 = (self.g * v3 + self.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = self.ic2eq + self.g * v1;

        // tanh(x·d)/d ≈ x for small x
        let v1_state = if self.drive > 0.0 {
            let d = 1.0 + self.drive * 3.0;
            fast_tanh(v1 * d) / d
        } else {
            v1
        };

        self.ic1eq = flush_denormal(2.0 * v1_state - self.ic1eq);
        self.ic2eq = flush_denormal(2.0 * v2 - self.ic2eq);

        let lp = v2;
        let hp = input - self.k * v1 - v2;
        (lp, hp)
    }
}

impl Effect for StateVariableFilter {
    fn process(&mut self, input: f32) -> f32 {
        let (lp, hp) = self.process_pair(input);
        match self.output_type {
            SvfOutput::Lowpass => lp,
            SvfOutput::Highpass => hp,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff = self.cutoff.min(sample_rate * 0.49);
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

/// Four-pole (24 dB/oct) SVF: two [`StateVariableFilter`] stages in series.
///
/// Both stages share cutoff, drive and output type. The combined Q is split
/// evenly (`Q_stage = Q × 0.5`, floored at 0.5) so the cascade does not ring
/// twice as hard as a single stage.
///
/// # Example
///
/// ```rust
/// use morphwave_core::{Effect, FourPoleSvf, SvfOutput};
///
/// let mut filter = FourPoleSvf::new(48000.0);
/// filter.set_cutoff(400.0);
/// filter.set_resonance(4.0);
/// filter.set_output_type(SvfOutput::Lowpass);
///
/// let mut block = [0.0f32; 32];
/// block[0] = 1.0;
/// filter.process_block_inplace(&mut block);
/// assert!(block.iter().all(|s| s.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct FourPoleSvf {
    stage1: StateVariableFilter,
    stage2: StateVariableFilter,
    resonance: f32,
    output_type: SvfOutput,
}

impl Default for FourPoleSvf {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl FourPoleSvf {
    /// Create a lowpass cascade at 1 kHz, Q 0.707, no drive.
    pub fn new(sample_rate: f32) -> Self {
        let mut svf = Self {
            stage1: StateVariableFilter::new(sample_rate),
            stage2: StateVariableFilter::new(sample_rate),
            resonance: 0.707,
            output_type: SvfOutput::Lowpass,
        };
        svf.split_resonance();
        svf
    }

    /// Set cutoff in Hz on both stages.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.stage1.set_cutoff(freq);
        self.stage2.set_cutoff(freq);
    }

    /// Current cutoff in Hz.
    pub fn cutoff(&self) -> f32 {
        self.stage1.cutoff()
    }

    /// Set the combined Q (0.5..=20.0).
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = q.clamp(0.5, 20.0);
        self.split_resonance();
    }

    /// Combined Q.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set saturation amount on both stages.
    pub fn set_drive(&mut self, drive: f32) {
        self.stage1.set_drive(drive);
        self.stage2.set_drive(drive);
    }

    /// Current saturation amount.
    pub fn drive(&self) -> f32 {
        self.stage1.drive()
    }

    /// Select lowpass or highpass for both stages.
    pub fn set_output_type(&mut self, output_type: SvfOutput) {
        self.output_type = output_type;
        self.stage1.set_output_type(output_type);
        self.stage2.set_output_type(output_type);
    }

    /// Current output selection.
    pub fn output_type(&self) -> SvfOutput {
        self.output_type
    }

    fn split_resonance(&mut self) {
        let q_stage = self.resonance * 0.5;
        self.stage1.set_resonance(q_stage);
        self.stage2.set_resonance(q_stage);
    }
}

impl Effect for FourPoleSvf {
    fn process(&mut self, input: f32) -> f32 {
        let mid = self.stage1.process(input);
        self.stage2.process(mid)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.stage1.set_sample_rate(sample_rate);
        self.stage2.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.stage1.reset();
        self.stage2.reset();
    }
}
