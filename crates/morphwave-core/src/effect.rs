//! Core Effect trait.
//!
//! The [`Effect`] trait is the common interface of every per-sample processor
//! in the engine: the voice filter, its SVF stages, and anything a host wants
//! to put after the synth.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: Single `f32` input/output. A voice renders a mono
//!   signal and fans it out to the output channels afterwards.
//!
//! - **Object-safe**: `dyn Effect` works, but generic/static dispatch is
//!   what the voice engine uses.
//!
//! - **No allocations**: All methods are callable from the audio thread.

/// Core trait for mono sample processors.
///
/// # Example
///
/// ```rust
/// use morphwave_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut block = [1.0f32; 4];
/// gain.process_block_inplace(&mut block);
/// assert_eq!(block, [0.5; 4]);
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples in-place.
    ///
    /// Default implementation calls [`process`](Self::process) per sample.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate and recalculate rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (filter history) without changing parameters.
    fn reset(&mut self);
}
