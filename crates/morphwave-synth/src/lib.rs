//! Morphwave Synth - Polyphonic wavetable voice engine
//!
//! This crate turns wavetable buffers and a parameter snapshot into audio:
//! morphable wavetable oscillators, LFOs and envelopes wired through a
//! per-voice modulation table, a resonant filter per voice, and a fixed
//! voice pool with deterministic stealing.
//!
//! # Core Components
//!
//! ## Wavetables
//!
//! - [`WaveTable`] - One cycle, resampled to [`TABLE_SIZE`] samples
//! - [`WaveTableVector`] - Tables blended by a continuous wave position
//! - [`WaveBank`] - Lock-free publication of vectors to the audio thread
//! - [`BasicShape`] - Procedural sine/triangle/saw/square tables
//!
//! ## Modulation
//!
//! - [`ModulatableParameter`] - Smoothed value with an LFO and an envelope source
//! - [`ModSource`] / [`ModValues`] - Tagged sources resolved per sample
//! - [`ModDestination`] - Every routable parameter
//!
//! ## Generators and Processing
//!
//! - [`WavetableOscillator`] / [`Lfo`] - Table readers at audio and sub-audio rates
//! - [`AdsrEnvelope`] - Linear ADSR with peek-without-advance
//! - [`VoiceFilter`] - 24 dB/oct low-pass/high-pass/bypass
//!
//! ## Voices
//!
//! - [`Voice`] - Two oscillators, three LFOs, three envelopes, one filter
//! - [`Synth`] - Fixed voice pool with allocation and master gain
//! - [`SynthParams`] - Control-rate snapshot, addressable by dotted path
//!
//! # Example
//!
//! ```rust
//! use morphwave_synth::{BasicShape, Synth, SynthParams, TableTarget, midi_to_freq};
//!
//! let mut synth: Synth<8> = Synth::new(48000.0, 512);
//! synth
//!     .bank()
//!     .load_shapes(TableTarget::Osc1, &[BasicShape::Saw, BasicShape::Square])
//!     .unwrap();
//!
//! let mut params = SynthParams::default();
//! params.set("osc1.wave", 0.5).unwrap();
//! params.set("osc1.wave.lfo_source", 1.0).unwrap();
//! params.set("filter.freq", 2000.0).unwrap();
//! params.set("env1.attack", 0.01).unwrap();
//!
//! // Once per block: update, events, render
//! synth.update(&params);
//! for note in [60, 64, 67] {
//!     synth.note_on(note, 100, midi_to_freq(note));
//! }
//! let mut buffer = vec![0.0f32; 512];
//! synth.render_block(&mut [&mut buffer[..]], 0, 512);
//! assert!(synth.rms() > 0.0);
//! ```
//!
//! # Features
//!
//! - `serde` - Serialize/deserialize [`SynthParams`] and the shape/target enums
//! - `tracing` - Debug events for voice stealing, table publication and
//!   filter mode changes (never from the sample loop)

pub mod bank;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod mod_param;
pub mod oscillator;
pub mod params;
pub mod shapes;
pub mod synth;
pub mod voice;
pub mod wavetable;

// Re-export main types at crate root
pub use bank::{BlockTables, LoadGuard, TableTarget, WaveBank};
pub use envelope::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
pub use error::SynthError;
pub use filter::{FilterMode, VoiceFilter};
pub use mod_param::{
    MIN_FREQUENCY_HZ, ModSource, ModValues, ModulatableParameter, NUM_ENVELOPES, NUM_LFOS,
    ParamKind, SourceKind,
};
pub use oscillator::{Lfo, LfoParam, WavetableOscillator};
pub use params::{
    FilterParams, LfoParams, ModDestination, ModTarget, NUM_OSCILLATORS, OscillatorParams,
    ParamSpec, SynthParams, param_specs,
};
pub use shapes::BasicShape;
pub use synth::{DEFAULT_VOICES, Synth};
pub use voice::{Voice, midi_to_freq};
pub use wavetable::{MAX_TABLES, TABLE_SIZE, WaveTable, WaveTableVector};
