//! Morphwave Core - DSP primitives for the morphwave synthesis engine
//!
//! This crate provides the low-level building blocks the voice engine is made
//! of, designed for real-time audio processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for mono sample processors
//!
//! ## Parameter Smoothing
//!
//! Zipper-free parameter changes for click-free automation:
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//! - [`LinearSmoothedParam`] - Linear ramps (constant rate, exact arrival)
//!
//! ## Filters
//!
//! - [`StateVariableFilter`] - 2-pole TPT SVF with lowpass and highpass outputs
//! - [`FourPoleSvf`] - Two cascaded SVF stages for 24 dB/oct slopes
//!
//! ## Utilities
//!
//! - Math functions: [`lerp`], [`flush_denormal`], [`fast_tanh`], [`rms`]
//! - Fast approximations: [`fast_tan`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! morphwave-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use morphwave_core::{Effect, FourPoleSvf, LinearSmoothedParam, SvfOutput};
//!
//! let mut cutoff = LinearSmoothedParam::with_config(400.0, 48000.0, 10.0);
//! let mut filter = FourPoleSvf::new(48000.0);
//! filter.set_output_type(SvfOutput::Lowpass);
//!
//! cutoff.set_target(2000.0);
//! let mut block = [0.25f32; 64];
//! for _ in 0..block.len() {
//!     cutoff.advance();
//! }
//! // Coefficients follow the control value once per block
//! filter.set_cutoff(cutoff.get());
//! filter.process_block_inplace(&mut block);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Object-safe traits**: Dynamic dispatch when needed

#![cfg_attr(not(feature = "std"), no_std)]

pub mod effect;
pub mod fast_math;
pub mod math;
pub mod param;
pub mod svf;

// Re-export main types at crate root
pub use effect::Effect;
pub use fast_math::fast_tan;
pub use math::{fast_tanh, flush_denormal, lerp, rms};
pub use param::{LinearSmoothedParam, SmoothedParam};
pub use svf::{FourPoleSvf, StateVariableFilter, SvfOutput};
