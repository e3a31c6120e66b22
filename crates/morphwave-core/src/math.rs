//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`lerp`] - Linear interpolation (wavetable reads, table morphing)
//! - [`flush_denormal`] - Keep filter feedback out of the subnormal range
//! - [`fast_tanh`] - Saturation curve for filter drive
//! - [`rms`] - Block level metering

use libm::{sqrtf, tanhf};

/// Linear interpolation between two values.
///
/// # Arguments
/// * `a` - Start value (at t=0)
/// * `b` - End value (at t=1)
/// * `t` - Interpolation factor (0.0 to 1.0)
///
/// # Example
/// ```rust
/// use morphwave_core::lerp;
///
/// assert_eq!(lerp(0.0, 2.0, 0.25), 0.5);
/// ```
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hyperbolic tangent.
///
/// Uses the actual tanh function from libm for accuracy.
#[inline]
pub fn fast_tanh(x: f32) -> f32 {
    tanhf(x)
}

/// Flush subnormal (denormalized) floats to zero.
///
/// Subnormal floats cause severe CPU slowdowns on most architectures. Values
/// below 1e-20 are replaced with zero, leaving margin before the IEEE 754
/// subnormal range begins. Use this in feedback paths that can decay toward
/// zero indefinitely.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Root-mean-square level of a block.
///
/// Returns 0.0 for an empty block.
///
/// # Example
/// ```rust
/// use morphwave_core::rms;
///
/// assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
/// assert_eq!(rms(&[]), 0.0);
/// ```
#[inline]
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = block.iter().map(|&s| s * s).sum();
    sqrtf(sum_sq / block.len() as f32)
}
