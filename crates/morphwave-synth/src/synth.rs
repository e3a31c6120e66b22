//! Polyphonic wavetable synthesizer.
//!
//! [`Synth`] owns a fixed pool of [`Voice`]s and the [`WaveBank`] they read
//! from. The host drives it once per audio block:
//!
//! 1. [`update`](Synth::update) with the current [`SynthParams`]
//! 2. note events ([`note_on`](Synth::note_on), [`note_off`](Synth::note_off),
//!    [`pitch_bend`](Synth::pitch_bend))
//! 3. [`render_block`](Synth::render_block)
//!
//! Rendering never allocates or blocks.

use morphwave_core::{SmoothedParam, rms};

use crate::bank::WaveBank;
use crate::mod_param::SMOOTHING_TIME_MS;
use crate::params::SynthParams;
use crate::voice::Voice;

/// Default voice count.
pub const DEFAULT_VOICES: usize = 4;

/// A polyphonic wavetable synthesizer with `N` voices.
///
/// # Example
///
/// ```rust
/// use morphwave_synth::{Synth, SynthParams, midi_to_freq};
///
/// let mut synth: Synth = Synth::new(48000.0, 256);
/// synth.update(&SynthParams::default());
/// synth.note_on(60, 100, midi_to_freq(60));
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// synth.render_block(&mut [&mut left[..], &mut right[..]], 0, 256);
///
/// assert_eq!(synth.active_voice_count(), 1);
/// assert!(synth.rms() > 0.0);
/// ```
#[derive(Debug)]
pub struct Synth<const N: usize = DEFAULT_VOICES> {
    voices: [Voice; N],
    bank: WaveBank,
    master_gain: SmoothedParam,
    /// RMS of the last rendered sub-block, averaged over channels
    rms: f32,
    /// Global voice age counter
    age_counter: u64,
    sample_rate: f32,
}

impl<const N: usize> Synth<N> {
    /// Create a synth with a freshly seeded wave bank.
    pub fn new(sample_rate: f32, max_block_size: usize) -> Self {
        Self::with_bank(WaveBank::new(), sample_rate, max_block_size)
    }

    /// Create a synth reading from `bank`. Clones of the bank can load tables
    /// from another thread.
    pub fn with_bank(bank: WaveBank, sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate, max_block_size)),
            bank,
            master_gain: SmoothedParam::with_config(1.0, sample_rate, SMOOTHING_TIME_MS),
            rms: 0.0,
            age_counter: 0,
            sample_rate,
        }
    }

    /// Shared handle to the wave bank.
    pub fn bank(&self) -> &WaveBank {
        &self.bank
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set sample rate for all voices.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.master_gain.set_sample_rate(sample_rate);
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Get number of voices.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Get number of active voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Get read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Set the master output gain. Changes are smoothed.
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain.set_target(gain);
    }

    /// Jump to `gain` without smoothing. For priming before the first block.
    pub fn set_master_gain_immediate(&mut self, gain: f32) {
        self.master_gain.set_immediate(gain);
    }

    /// Target master gain.
    pub fn master_gain(&self) -> f32 {
        self.master_gain.target()
    }

    /// RMS of the last rendered block.
    pub fn rms(&self) -> f32 {
        self.rms
    }

    /// Apply a parameter snapshot to every voice. Call between blocks only.
    pub fn update(&mut self, params: &SynthParams) {
        for voice in &mut self.voices {
            voice.update(params);
        }
    }

    /// Start a note on a free voice, stealing one if every voice is busy.
    pub fn note_on(&mut self, note: u8, velocity: u8, frequency: f32) {
        if N == 0 {
            return;
        }
        let idx = self.allocate_voice(note);
        self.age_counter += 1;
        let voice = &mut self.voices[idx];
        voice.set_age(self.age_counter);
        voice.note_on(note, velocity, frequency);
    }

    /// Release every active voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.note_off();
            }
        }
    }

    /// Glide every active voice playing `note` to `frequency`.
    pub fn pitch_bend(&mut self, note: u8, frequency: f32) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.note() == note {
                voice.pitch_bend(frequency);
            }
        }
    }

    /// Stop all notes immediately.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Add every active voice into `output[..][start..start + num]`, then
    /// apply master gain to that range and measure its RMS.
    ///
    /// Output is accumulated, not overwritten; clear the buffers first for
    /// a dry render. Every channel must hold at least `start + num` samples.
    pub fn render_block(&mut self, output: &mut [&mut [f32]], start: usize, num: usize) {
        debug_assert!(
            output.iter().all(|channel| start + num <= channel.len()),
            "render range {start}..{} runs past a channel",
            start + num
        );
        let tables = self.bank.block_tables();
        for voice in &mut self.voices {
            voice.render_block(&tables, output, start, num);
        }

        let end = start + num;
        for i in start..end {
            let gain = self.master_gain.advance();
            for channel in output.iter_mut() {
                if let Some(sample) = channel.get_mut(i) {
                    *sample *= gain;
                }
            }
        }

        let channels = output.len();
        self.rms = if channels == 0 {
            0.0
        } else {
            output
                .iter()
                .map(|channel| rms(channel.get(start..end.min(channel.len())).unwrap_or(&[])))
                .sum::<f32>()
                / channels as f32
        };
    }

    fn allocate_voice(&self, _note: u8) -> usize {
        if let Some(free) = self.voices.iter().position(|v| !v.is_active()) {
            return free;
        }

        // Quietest voice first, oldest among equals
        let victim = self
            .voices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.amp_level()
                    .total_cmp(&b.amp_level())
                    .then(a.age().cmp(&b.age()))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            voice = victim,
            stolen_note = self.voices[victim].note(),
            new_note = _note,
            "voice stolen"
        );

        victim
    }
}
