//! Per-voice multimode filter.
//!
//! A 24 dB/octave four-pole state-variable filter with low-pass, high-pass
//! and bypass modes. The voice drives it with block-rate coefficients taken
//! from its last modulated cutoff, resonance and drive values.

use morphwave_core::{Effect, FourPoleSvf, SvfOutput};

/// Default filter cutoff in Hz.
pub const DEFAULT_CUTOFF_HZ: f32 = 400.0;

/// Q at zero normalized resonance.
const MIN_Q: f32 = 0.707;

/// Q at full normalized resonance.
const MAX_Q: f32 = 10.0;

/// Drive above this maps to full saturation.
const MAX_DRIVE: f32 = 4.0;

/// Filter response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// 24 dB/oct high-pass
    Highpass,
    /// 24 dB/oct low-pass
    #[default]
    Lowpass,
    /// Signal passes untouched
    Bypass,
}

impl FilterMode {
    /// Mode for a selector index: 0 = high-pass, 1 = low-pass, 2 = bypass.
    ///
    /// ```rust
    /// use morphwave_synth::FilterMode;
    ///
    /// assert_eq!(FilterMode::from_index(0), Some(FilterMode::Highpass));
    /// assert_eq!(FilterMode::from_index(2), Some(FilterMode::Bypass));
    /// assert_eq!(FilterMode::from_index(3), None);
    /// ```
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(FilterMode::Highpass),
            1 => Some(FilterMode::Lowpass),
            2 => Some(FilterMode::Bypass),
            _ => None,
        }
    }

    /// Selector index of this mode.
    pub fn index(self) -> i32 {
        match self {
            FilterMode::Highpass => 0,
            FilterMode::Lowpass => 1,
            FilterMode::Bypass => 2,
        }
    }
}

/// Resonant multimode voice filter.
///
/// # Example
///
/// ```rust
/// use morphwave_core::Effect;
/// use morphwave_synth::{FilterMode, VoiceFilter};
///
/// let mut filter = VoiceFilter::new(48000.0);
/// filter.set_mode_index(2);
/// assert_eq!(filter.mode(), FilterMode::Bypass);
/// assert_eq!(filter.process(0.3), 0.3);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceFilter {
    svf: FourPoleSvf,
    mode: FilterMode,
    resonance: f32,
    drive: f32,
}

impl Default for VoiceFilter {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl VoiceFilter {
    /// Create a low-pass filter at the default cutoff with no resonance or drive.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            svf: FourPoleSvf::new(sample_rate),
            mode: FilterMode::Lowpass,
            resonance: 0.0,
            drive: 1.0,
        };
        filter.svf.set_cutoff(DEFAULT_CUTOFF_HZ);
        filter.set_resonance(0.0);
        filter.set_drive(1.0);
        filter
    }

    /// Select the mode by index. Indices outside `0..=2` keep the current mode.
    pub fn set_mode_index(&mut self, index: i32) {
        if let Some(mode) = FilterMode::from_index(index) {
            self.set_mode(mode);
        }
    }

    /// Select the mode.
    pub fn set_mode(&mut self, mode: FilterMode) {
        if mode == self.mode {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?self.mode, to = ?mode, "filter mode changed");

        self.mode = mode;
        match mode {
            FilterMode::Highpass => self.svf.set_output_type(SvfOutput::Highpass),
            FilterMode::Lowpass => self.svf.set_output_type(SvfOutput::Lowpass),
            FilterMode::Bypass => {}
        }
    }

    /// Current mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Set cutoff in Hz.
    pub fn set_cutoff(&mut self, freq: f32) {
        self.svf.set_cutoff(freq);
    }

    /// Current cutoff in Hz, after the SVF's own range clamp.
    pub fn cutoff(&self) -> f32 {
        self.svf.cutoff()
    }

    /// Set normalized resonance, clamped to `[0, 1]` and mapped onto Q 0.707..10.
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0);
        self.svf.set_resonance(MIN_Q + self.resonance * (MAX_Q - MIN_Q));
    }

    /// Normalized resonance.
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set drive (`1.0` = clean). Values below 1 are raised to 1.
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = drive.max(1.0);
        let amount = ((self.drive - 1.0) / (MAX_DRIVE - 1.0)).clamp(0.0, 1.0);
        self.svf.set_drive(amount);
    }

    /// Current drive.
    pub fn drive(&self) -> f32 {
        self.drive
    }
}

impl Effect for VoiceFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        match self.mode {
            FilterMode::Bypass => input,
            FilterMode::Highpass | FilterMode::Lowpass => self.svf.process(input),
        }
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        if self.mode != FilterMode::Bypass {
            self.svf.process_block_inplace(buffer);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.svf.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.svf.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_rms(filter: &mut VoiceFilter, freq: f32) -> f32 {
        let sr = 48000.0;
        let mut block: Vec<f32> = (0..9600)
            .map(|i| libm::sinf(core::f32::consts::TAU * freq * i as f32 / sr))
            .collect();
        filter.process_block_inplace(&mut block);
        let tail = &block[4800..];
        libm::sqrtf(tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32)
    }

    #[test]
    fn defaults() {
        let filter = VoiceFilter::new(48000.0);
        assert_eq!(filter.mode(), FilterMode::Lowpass);
        assert_eq!(filter.cutoff(), DEFAULT_CUTOFF_HZ);
        assert_eq!(filter.resonance(), 0.0);
        assert_eq!(filter.drive(), 1.0);
    }

    #[test]
    fn mode_index_mapping() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_mode_index(0);
        assert_eq!(filter.mode(), FilterMode::Highpass);
        filter.set_mode_index(7);
        assert_eq!(filter.mode(), FilterMode::Highpass);
        filter.set_mode_index(-1);
        assert_eq!(filter.mode(), FilterMode::Highpass);
        filter.set_mode_index(1);
        assert_eq!(filter.mode(), FilterMode::Lowpass);
        for mode in [FilterMode::Highpass, FilterMode::Lowpass, FilterMode::Bypass] {
            assert_eq!(FilterMode::from_index(mode.index()), Some(mode));
        }
    }

    #[test]
    fn resonance_is_clamped() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_resonance(3.0);
        assert_eq!(filter.resonance(), 1.0);
        filter.set_resonance(-1.0);
        assert_eq!(filter.resonance(), 0.0);
    }

    #[test]
    fn lowpass_attenuates_highs() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_cutoff(500.0);
        let rms = sine_rms(&mut filter, 8000.0);
        assert!(rms < 0.01, "8 kHz through 500 Hz LPF: {rms}");
    }

    #[test]
    fn highpass_attenuates_lows() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_mode_index(0);
        filter.set_cutoff(4000.0);
        let rms = sine_rms(&mut filter, 100.0);
        assert!(rms < 0.01, "100 Hz through 4 kHz HPF: {rms}");
    }

    #[test]
    fn bypass_is_exact() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_mode(FilterMode::Bypass);
        let mut block = [0.1, -0.7, 0.25, 1.5];
        filter.process_block_inplace(&mut block);
        assert_eq!(block, [0.1, -0.7, 0.25, 1.5]);
    }

    #[test]
    fn heavy_drive_stays_finite() {
        let mut filter = VoiceFilter::new(48000.0);
        filter.set_drive(10.0);
        filter.set_resonance(1.0);
        let mut block = [2.0f32; 512];
        filter.process_block_inplace(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }
}
