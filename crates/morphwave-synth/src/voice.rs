//! A single synthesizer voice.
//!
//! Signal chain per voice:
//!
//! ```text
//! LFO 1..3 ──┐
//! ENV 1..3 ──┼── ModValues ──> modulatable parameters
//!            │
//! OSC 1 ─┐   │
//!        ├─ + ─> × ENV 1 ─> scratch ─> filter ─> + every output channel
//! OSC 2 ─┘
//! ```
//!
//! Envelope 1 is the amplitude envelope: the voice is active exactly while
//! it is not idle. All parameter changes arrive through [`Voice::update`]
//! at the top of a block and are smoothed inside the sample loop.

use morphwave_core::Effect;

use crate::bank::{BlockTables, TableTarget};
use crate::envelope::AdsrEnvelope;
use crate::filter::{DEFAULT_CUTOFF_HZ, VoiceFilter};
use crate::mod_param::{
    ModValues, ModulatableParameter, NUM_ENVELOPES, NUM_LFOS, ParamKind, SourceKind,
};
use crate::oscillator::{Lfo, LfoParam, WavetableOscillator};
use crate::params::{ModDestination, NUM_OSCILLATORS, SynthParams};
use crate::wavetable::WaveTableVector;

/// A single synthesizer voice.
///
/// Owns two wavetable oscillators, three LFOs, three envelopes, a filter
/// with modulatable cutoff, resonance and drive, and a mono scratch buffer
/// sized at construction.
#[derive(Debug, Clone)]
pub struct Voice {
    oscillators: [WavetableOscillator; NUM_OSCILLATORS],
    lfos: [Lfo; NUM_LFOS],
    envelopes: [AdsrEnvelope; NUM_ENVELOPES],

    filter: VoiceFilter,
    filter_freq: ModulatableParameter,
    filter_res: ModulatableParameter,
    filter_drive: ModulatableParameter,

    /// Modulator outputs of the current sample
    mods: ModValues,
    /// Mono render buffer, never resized after construction
    scratch: Vec<f32>,

    sample_rate: f32,
    note: u8,
    velocity: u8,
    /// Allocation order, for voice stealing
    age: u64,
}

impl Voice {
    /// Create an idle voice rendering at most `max_block_size` samples per chunk.
    pub fn new(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            oscillators: core::array::from_fn(|_| WavetableOscillator::new(sample_rate)),
            lfos: core::array::from_fn(|_| Lfo::new(sample_rate)),
            envelopes: core::array::from_fn(|_| AdsrEnvelope::new(sample_rate)),
            filter: VoiceFilter::new(sample_rate),
            filter_freq: ModulatableParameter::new(
                ParamKind::Frequency,
                DEFAULT_CUTOFF_HZ,
                sample_rate,
            ),
            filter_res: ModulatableParameter::new(ParamKind::Gain, 0.0, sample_rate),
            filter_drive: ModulatableParameter::new(ParamKind::Gain, 1.0, sample_rate),
            mods: ModValues::default(),
            scratch: vec![0.0; max_block_size.max(1)],
            sample_rate,
            note: 0,
            velocity: 0,
            age: 0,
        }
    }

    /// Set sample rate for all components.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for osc in &mut self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
        for lfo in &mut self.lfos {
            lfo.set_sample_rate(sample_rate);
        }
        for env in &mut self.envelopes {
            env.set_sample_rate(sample_rate);
        }
        self.filter.set_sample_rate(sample_rate);
        self.filter_freq.set_sample_rate(sample_rate);
        self.filter_res.set_sample_rate(sample_rate);
        self.filter_drive.set_sample_rate(sample_rate);
    }

    /// Start a note. Oscillators jump to `frequency` and every envelope attacks.
    pub fn note_on(&mut self, note: u8, velocity: u8, frequency: f32) {
        if !self.is_active() {
            self.filter.reset();
        }
        self.note = note;
        self.velocity = velocity;
        for osc in &mut self.oscillators {
            osc.note_on(frequency);
        }
        for env in &mut self.envelopes {
            env.note_on();
        }
    }

    /// Release every envelope.
    pub fn note_off(&mut self) {
        for env in &mut self.envelopes {
            env.note_off();
        }
    }

    /// Glide both oscillators to `frequency`.
    pub fn pitch_bend(&mut self, frequency: f32) {
        for osc in &mut self.oscillators {
            osc.pitch_bend(frequency);
        }
    }

    /// Silence the voice immediately.
    pub fn kill(&mut self) {
        for env in &mut self.envelopes {
            env.reset();
        }
        self.mods.env = [0.0; NUM_ENVELOPES];
        self.filter.reset();
    }

    /// Whether the amplitude envelope is running.
    pub fn is_active(&self) -> bool {
        self.envelopes[0].is_active()
    }

    /// Current amplitude envelope level.
    pub fn amp_level(&self) -> f32 {
        self.envelopes[0].peek()
    }

    /// Note number of the last note-on.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Velocity of the last note-on.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Voice age.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Set voice age.
    pub fn set_age(&mut self, age: u64) {
        self.age = age;
    }

    /// Largest chunk rendered in one pass.
    pub fn max_block_size(&self) -> usize {
        self.scratch.len()
    }

    /// Modulator outputs of the last rendered sample.
    pub fn mod_values(&self) -> &ModValues {
        &self.mods
    }

    /// Melodic oscillator `index` (0 or 1).
    pub fn oscillator(&self, index: usize) -> Option<&WavetableOscillator> {
        self.oscillators.get(index)
    }

    /// Envelope `index` (0 is the amplitude envelope).
    pub fn envelope(&self, index: usize) -> Option<&AdsrEnvelope> {
        self.envelopes.get(index)
    }

    /// Voice filter.
    pub fn filter(&self) -> &VoiceFilter {
        &self.filter
    }

    /// The parameter behind a modulation destination.
    pub fn param(&self, dest: ModDestination) -> &ModulatableParameter {
        match dest {
            ModDestination::Osc1Gain => self.oscillators[0].gain(),
            ModDestination::Osc1Wave => self.oscillators[0].wave_position(),
            ModDestination::Osc1Pitch => self.oscillators[0].frequency(),
            ModDestination::Osc2Gain => self.oscillators[1].gain(),
            ModDestination::Osc2Wave => self.oscillators[1].wave_position(),
            ModDestination::Osc2Pitch => self.oscillators[1].frequency(),
            ModDestination::Lfo1Rate => self.lfos[0].param(LfoParam::Rate),
            ModDestination::Lfo1Depth => self.lfos[0].param(LfoParam::Depth),
            ModDestination::Lfo2Rate => self.lfos[1].param(LfoParam::Rate),
            ModDestination::Lfo2Depth => self.lfos[1].param(LfoParam::Depth),
            ModDestination::Lfo3Rate => self.lfos[2].param(LfoParam::Rate),
            ModDestination::Lfo3Depth => self.lfos[2].param(LfoParam::Depth),
            ModDestination::FilterFreq => &self.filter_freq,
            ModDestination::FilterRes => &self.filter_res,
            ModDestination::FilterDrive => &self.filter_drive,
        }
    }

    fn param_mut(&mut self, dest: ModDestination) -> &mut ModulatableParameter {
        match dest {
            ModDestination::Osc1Gain => self.oscillators[0].gain_mut(),
            ModDestination::Osc1Wave => self.oscillators[0].wave_position_mut(),
            ModDestination::Osc1Pitch => self.oscillators[0].frequency_mut(),
            ModDestination::Osc2Gain => self.oscillators[1].gain_mut(),
            ModDestination::Osc2Wave => self.oscillators[1].wave_position_mut(),
            ModDestination::Osc2Pitch => self.oscillators[1].frequency_mut(),
            ModDestination::Lfo1Rate => self.lfos[0].param_mut(LfoParam::Rate),
            ModDestination::Lfo1Depth => self.lfos[0].param_mut(LfoParam::Depth),
            ModDestination::Lfo2Rate => self.lfos[1].param_mut(LfoParam::Rate),
            ModDestination::Lfo2Depth => self.lfos[1].param_mut(LfoParam::Depth),
            ModDestination::Lfo3Rate => self.lfos[2].param_mut(LfoParam::Rate),
            ModDestination::Lfo3Depth => self.lfos[2].param_mut(LfoParam::Depth),
            ModDestination::FilterFreq => &mut self.filter_freq,
            ModDestination::FilterRes => &mut self.filter_res,
            ModDestination::FilterDrive => &mut self.filter_drive,
        }
    }

    /// Route source `index` of `kind` to `dest`.
    ///
    /// `0` or any index outside `1..=3` clears the route. LFO destinations
    /// only take envelope sources; an LFO source there clears the route.
    pub fn assign_modulation(&mut self, dest: ModDestination, kind: SourceKind, index: i32) {
        let index = if kind == SourceKind::Lfo && !dest.accepts_lfo() {
            0
        } else {
            index
        };
        self.param_mut(dest).assign(kind, index);
    }

    /// Apply a full parameter snapshot. Call between blocks only.
    pub fn update(&mut self, params: &SynthParams) {
        self.filter.set_mode_index(params.filter.mode);

        for dest in ModDestination::ALL {
            let target = *params.target(dest);
            self.assign_modulation(dest, SourceKind::Lfo, target.lfo_source);
            self.assign_modulation(dest, SourceKind::Envelope, target.env_source);

            let param = self.param_mut(dest);
            param.set_lfo_scale(target.lfo_scale);
            param.set_env_scale(target.env_scale);
            match dest {
                ModDestination::Osc1Pitch | ModDestination::Osc2Pitch => {
                    param.set_offset(target.value);
                }
                _ => param.set_value(target.value),
            }
        }

        for (env, p) in self.envelopes.iter_mut().zip(params.envelopes) {
            env.set_params(p);
        }
    }

    /// Add this voice's output for `output[..][start..start + num]`.
    ///
    /// Renders nothing while an oscillator table is loading. Blocks longer
    /// than the scratch buffer are rendered in chunks.
    pub fn render_block(
        &mut self,
        tables: &BlockTables,
        output: &mut [&mut [f32]],
        start: usize,
        num: usize,
    ) {
        debug_assert!(
            output.iter().all(|channel| start + num <= channel.len()),
            "render range {start}..{} runs past a channel",
            start + num
        );
        if !self.is_active() {
            return;
        }
        let (Some(osc1), Some(osc2)) = (tables.get(TableTarget::Osc1), tables.get(TableTarget::Osc2))
        else {
            return;
        };
        let lfo_tables = TableTarget::LFOS.map(|target| tables.get(target));

        let end = start + num;
        let mut offset = start;
        while offset < end && self.is_active() {
            let len = (end - offset).min(self.scratch.len());
            self.render_chunk([osc1, osc2], &lfo_tables, len);

            let chunk = &self.scratch[..len];
            for channel in output.iter_mut() {
                if let Some(dst) = channel.get_mut(offset..offset + len) {
                    for (out, s) in dst.iter_mut().zip(chunk) {
                        *out += *s;
                    }
                }
            }
            offset += len;
        }
    }

    /// Fill `scratch[..len]` and filter it.
    fn render_chunk(
        &mut self,
        osc_tables: [&WaveTableVector; NUM_OSCILLATORS],
        lfo_tables: &[Option<&WaveTableVector>; NUM_LFOS],
        len: usize,
    ) {
        let mut freq = self.filter_freq.current();
        let mut res = self.filter_res.current();
        let mut drive = self.filter_drive.current();

        for i in 0..len {
            if !self.envelopes[0].is_active() {
                self.scratch[i..len].fill(0.0);
                break;
            }

            for (k, lfo) in self.lfos.iter_mut().enumerate() {
                let value = lfo.tick(lfo_tables[k], &self.mods);
                self.mods.lfo[k] = value;
            }
            for (k, env) in self.envelopes.iter_mut().enumerate() {
                self.mods.env[k] = env.tick();
            }

            freq = self.filter_freq.tick(&self.mods);
            res = self.filter_res.tick(&self.mods);
            drive = self.filter_drive.tick(&self.mods);

            let mut sample = 0.0;
            for (osc, table) in self.oscillators.iter_mut().zip(osc_tables) {
                sample += osc.next_sample(table, &self.mods);
            }
            self.scratch[i] = sample * self.envelopes[0].peek();
        }

        self.filter.set_cutoff(freq);
        self.filter.set_resonance(res);
        self.filter.set_drive(drive);
        self.filter.process_block_inplace(&mut self.scratch[..len]);
    }
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::WaveBank;
    use crate::envelope::{EnvelopeParams, EnvelopeState};
    use crate::mod_param::ModSource;
    use crate::params::ModTarget;
    use crate::wavetable::TABLE_SIZE;

    const SR: f32 = 48000.0;

    /// Bank with constant tables in both oscillator slots.
    fn dc_bank(level: f32) -> WaveBank {
        let bank = WaveBank::new();
        let dc = vec![level; TABLE_SIZE];
        bank.load_from_buffers(TableTarget::Osc1, &[dc.clone(), dc.clone()])
            .unwrap();
        bank.load_from_buffers(TableTarget::Osc2, &[dc.clone(), dc]).unwrap();
        bank
    }

    /// Bypassed filter and an envelope that sits at full level.
    fn flat_params() -> SynthParams {
        let mut params = SynthParams::default();
        params.filter.mode = 2;
        params.envelopes[0] = EnvelopeParams::new(0.0, 0.0, 1.0, 0.0);
        params
    }

    fn render(voice: &mut Voice, bank: &WaveBank, num: usize) -> Vec<f32> {
        let mut out = vec![0.0; num];
        voice.render_block(&bank.block_tables(), &mut [out.as_mut_slice()], 0, num);
        out
    }

    #[test]
    fn test_midi_to_freq_a4() {
        let freq = midi_to_freq(69);
        assert!(
            (freq - 440.0).abs() < 0.01,
            "A4 should be 440 Hz, got {}",
            freq
        );
    }

    #[test]
    fn test_midi_to_freq_middle_c() {
        let freq = midi_to_freq(60);
        assert!(
            (freq - 261.63).abs() < 0.1,
            "C4 should be ~261.63 Hz, got {}",
            freq
        );
    }

    #[test]
    fn test_voice_note_on_off() {
        let mut voice = Voice::new(SR, 64);
        assert!(!voice.is_active());

        voice.note_on(60, 100, midi_to_freq(60));
        assert!(voice.is_active());
        assert_eq!(voice.note(), 60);
        assert_eq!(voice.velocity(), 100);

        voice.note_off();
        assert_eq!(voice.envelope(0).unwrap().state(), EnvelopeState::Release);
        assert!(voice.is_active(), "voice stays active while releasing");

        voice.kill();
        assert!(!voice.is_active());
    }

    #[test]
    fn test_constant_output_with_flat_envelope() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        voice.update(&flat_params());
        voice.note_on(60, 100, 261.0);

        // (0.5·0.25 + 0.5·0.25) · 1.0
        let out = render(&mut voice, &bank, 32);
        assert!(out.iter().all(|&s| s == 0.25), "{out:?}");
    }

    #[test]
    fn test_idle_voice_adds_nothing() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        let mut out = vec![0.5; 16];
        voice.render_block(&bank.block_tables(), &mut [out.as_mut_slice()], 0, 16);
        assert!(out.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_render_adds_into_every_channel() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        voice.update(&flat_params());
        voice.note_on(60, 100, 261.0);

        let mut left = vec![1.0; 8];
        let mut right = vec![-1.0; 8];
        voice.render_block(
            &bank.block_tables(),
            &mut [left.as_mut_slice(), right.as_mut_slice()],
            0,
            8,
        );
        assert!(left.iter().all(|&s| s == 1.25));
        assert!(right.iter().all(|&s| s == -0.75));
    }

    #[test]
    fn test_render_respects_start_offset() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        voice.update(&flat_params());
        voice.note_on(60, 100, 261.0);

        let mut out = vec![0.0; 16];
        voice.render_block(&bank.block_tables(), &mut [out.as_mut_slice()], 4, 8);
        assert!(out[..4].iter().all(|&s| s == 0.0));
        assert!(out[4..12].iter().all(|&s| s == 0.25));
        assert!(out[12..].iter().all(|&s| s == 0.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "runs past a channel")]
    fn test_range_past_channel_end_is_caught() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        let mut out = vec![0.0; 8];
        voice.render_block(&bank.block_tables(), &mut [out.as_mut_slice()], 4, 8);
    }

    #[test]
    fn test_blocks_longer_than_scratch_are_chunked() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 16);
        voice.update(&flat_params());
        voice.note_on(60, 100, 261.0);

        let out = render(&mut voice, &bank, 100);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_loading_oscillator_slot_is_silent() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        voice.update(&flat_params());
        voice.note_on(60, 100, 261.0);

        let guard = bank.begin_load(TableTarget::Osc2);
        let out = render(&mut voice, &bank, 32);
        assert!(out.iter().all(|&s| s == 0.0));
        drop(guard);

        let out = render(&mut voice, &bank, 32);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_voice_stops_mid_block_when_released() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 256);
        let mut params = flat_params();
        // 1 ms release = 48 samples
        params.envelopes[0].release = 0.001;
        voice.update(&params);
        voice.note_on(60, 100, 261.0);
        voice.note_off();

        let out = render(&mut voice, &bank, 256);
        assert!(!voice.is_active());
        assert!(out[0] > 0.2);
        assert!(out[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_update_routes_and_scales() {
        let mut voice = Voice::new(SR, 64);
        let mut params = SynthParams::default();
        params.oscillators[0].wave = ModTarget::new(0.3).with_lfo(2, 0.5).with_env(3, -1.0);
        params.filter.freq = params.filter.freq.with_env(1, 4.0);
        params.lfos[0].rate = ModTarget::new(3.0).with_lfo(1, 1.0).with_env(2, 1.0);
        params.filter.mode = 0;
        voice.update(&params);

        let wave = voice.param(ModDestination::Osc1Wave);
        assert_eq!(wave.lfo_source(), ModSource::Lfo(1));
        assert_eq!(wave.env_source(), ModSource::Envelope(2));
        assert_eq!(wave.target(), 0.3);
        assert_eq!(
            voice.param(ModDestination::FilterFreq).env_source(),
            ModSource::Envelope(0)
        );

        let rate = voice.param(ModDestination::Lfo1Rate);
        assert_eq!(rate.lfo_source(), ModSource::None);
        assert_eq!(rate.env_source(), ModSource::Envelope(1));
        assert_eq!(voice.filter().mode(), crate::FilterMode::Highpass);
    }

    #[test]
    fn test_out_of_range_source_clears_route() {
        let mut voice = Voice::new(SR, 64);
        voice.assign_modulation(ModDestination::Osc2Gain, SourceKind::Lfo, 2);
        assert_eq!(voice.param(ModDestination::Osc2Gain).lfo_source(), ModSource::Lfo(1));
        voice.assign_modulation(ModDestination::Osc2Gain, SourceKind::Lfo, 9);
        assert_eq!(voice.param(ModDestination::Osc2Gain).lfo_source(), ModSource::None);
    }

    #[test]
    fn test_pitch_offset_scales_frequency() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        let mut params = flat_params();
        params.oscillators[1].pitch.value = 1.0;
        voice.update(&params);
        voice.note_on(60, 100, 200.0);
        render(&mut voice, &bank, 4);

        assert_eq!(voice.oscillator(0).unwrap().frequency().current(), 200.0);
        assert_eq!(voice.oscillator(1).unwrap().frequency().current(), 400.0);
    }

    #[test]
    fn test_envelope_modulates_gain() {
        let bank = dc_bank(0.25);
        let mut voice = Voice::new(SR, 64);
        let mut params = flat_params();
        params.envelopes[1] = EnvelopeParams::new(0.0, 0.0, 0.5, 0.0);
        params.oscillators[0].gain = ModTarget::new(0.5).with_env(2, 1.0);
        params.oscillators[1].gain = ModTarget::new(0.0);
        voice.update(&params);
        voice.note_on(60, 100, 261.0);

        // Let the osc2 gain ramp to zero
        render(&mut voice, &bank, 600);
        let out = render(&mut voice, &bank, 8);
        // 0.25 · 0.5 · 0.5
        assert!(out.iter().all(|&s| s == 0.0625), "{out:?}");
    }
}
