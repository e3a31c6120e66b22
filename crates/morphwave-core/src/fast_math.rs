//! Fast mathematical approximations.
//!
//! These functions trade full IEEE 754 precision for speed in coefficient
//! computation, where the input range is bounded and perceptual accuracy
//! matters more than mathematical accuracy.
//!
//! | Function | Replaces | Use case | Max error |
//! |----------|----------|----------|-----------|
//! | [`fast_tan`] | `libm::tanf` | Filter coefficients | < 0.1% (f < sr/4) |

/// Fast tangent for small positive angles.
///
/// Uses a Padé \[2/1\] rational approximation:
///   `tan(x) ≈ x · (15 − x²) / (15 − 6x²)`
///
/// # Accuracy
///
/// | Frequency (@ 48 kHz) | Argument x = π·f/sr | Relative error |
/// |----------------------|---------------------|----------------|
/// | < 4.6 kHz | < 0.3 | < 0.03% |
/// | < 7.6 kHz | < 0.5 | < 0.2% |
/// | < 15.3 kHz | < 1.0 | < 2% |
///
/// # Arguments
///
/// * `x` - Angle in radians. Valid for x ∈ \[0, π/3\].
///
/// # Examples
///
/// ```
/// use morphwave_core::fast_math::fast_tan;
///
/// // 1 kHz @ 48 kHz: argument ≈ 0.0654
/// let x = core::f32::consts::PI * 1000.0 / 48000.0;
/// let exact = libm::tanf(x);
/// assert!((fast_tan(x) - exact).abs() / exact < 0.001);
/// ```
#[inline]
pub fn fast_tan(x: f32) -> f32 {
    let x2 = x * x;
    x * (15.0 - x2) / (15.0 - 6.0 * x2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tan_matches_libm_in_filter_range() {
        let sr = 48000.0;
        let mut max_rel_err: f32 = 0.0;
        for i in 1..200 {
            let freq = i as f32 * 38.0; // 38 Hz .. 7.5 kHz
            let x = core::f32::consts::PI * freq / sr;
            let exact = libm::tanf(x);
            let rel_err = (fast_tan(x) - exact).abs() / exact;
            if rel_err > max_rel_err {
                max_rel_err = rel_err;
            }
        }
        assert!(
            max_rel_err < 0.002,
            "fast_tan max relative error {max_rel_err} exceeds 0.2%"
        );
    }

    #[test]
    fn tan_zero() {
        assert_eq!(fast_tan(0.0), 0.0);
    }
}
