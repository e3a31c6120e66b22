//! Property-based tests for morphwave-core DSP primitives.
//!
//! Filter stability across the whole parameter space the voice filter can
//! reach, and convergence of both smoothers.

use proptest::prelude::*;
use morphwave_core::{
    Effect, FourPoleSvf, LinearSmoothedParam, SmoothedParam, StateVariableFilter, SvfOutput,
};

fn output_type(highpass: bool) -> SvfOutput {
    if highpass {
        SvfOutput::Highpass
    } else {
        SvfOutput::Lowpass
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any cutoff, Q and drive keeps the 2-pole SVF finite.
    #[test]
    fn svf_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.5f32..20.0f32,
        drive in 0.0f32..=1.0f32,
        highpass in any::<bool>(),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut svf = StateVariableFilter::new(48000.0);
        svf.set_cutoff(freq);
        svf.set_resonance(q);
        svf.set_drive(drive);
        svf.set_output_type(output_type(highpass));

        for &sample in &input {
            let out = svf.process(sample);
            prop_assert!(
                out.is_finite(),
                "SVF (freq={}, q={}, drive={}) produced {} for input {}",
                freq, q, drive, out, sample
            );
        }
    }

    /// The cascade stays finite and bounded while its cutoff is swept every
    /// block, the way a modulated voice filter is driven.
    #[test]
    fn four_pole_swept_cutoff_is_bounded(
        start in 100.0f32..15000.0f32,
        end in 100.0f32..15000.0f32,
        q in 0.707f32..10.0f32,
        drive in 0.0f32..=1.0f32,
        highpass in any::<bool>(),
    ) {
        let mut svf = FourPoleSvf::new(48000.0);
        svf.set_resonance(q);
        svf.set_drive(drive);
        svf.set_output_type(output_type(highpass));

        let blocks = 32;
        let mut phase = 0.0f32;
        for b in 0..blocks {
            let t = b as f32 / (blocks - 1) as f32;
            svf.set_cutoff(start + (end - start) * t);
            for _ in 0..64 {
                phase += 0.05;
                let out = svf.process(libm::sinf(phase));
                prop_assert!(
                    out.is_finite() && out.abs() < 1000.0,
                    "cascade blew up: start={}, end={}, q={}, out={}",
                    start, end, q, out
                );
            }
        }
    }

    /// A single linear ramp never overshoots, moves in one direction and
    /// lands exactly on the target.
    #[test]
    fn linear_ramp_is_monotonic_and_exact(
        initial in -20000.0f32..20000.0f32,
        target in -20000.0f32..20000.0f32,
        ramp_ms in 0.0f32..50.0f32,
    ) {
        let mut param = LinearSmoothedParam::with_config(initial, 48000.0, ramp_ms);
        param.set_target(target);

        let rising = target >= initial;
        let mut previous = param.get();
        let samples = (ramp_ms / 1000.0 * 48000.0) as usize + 1;
        for _ in 0..samples {
            let value = param.advance();
            if rising {
                prop_assert!(value >= previous, "ramp reversed: {} -> {}", previous, value);
            } else {
                prop_assert!(value <= previous, "ramp reversed: {} -> {}", previous, value);
            }
            previous = value;
        }
        prop_assert_eq!(param.get(), target);
        prop_assert!(param.is_settled());
    }

    /// The exponential smoother converges to within f32 resolution.
    ///
    /// The per-sample step `coeff·(target − current)` rounds to zero once the
    /// gap is about `ULP(target) / coeff`, so the tolerance scales with the
    /// target.
    #[test]
    fn exponential_smoother_converges(
        initial in -100.0f32..100.0f32,
        target in -100.0f32..100.0f32,
    ) {
        let mut param = SmoothedParam::with_config(initial, 48000.0, 10.0);
        param.set_target(target);

        for _ in 0..10000 {
            param.advance();
        }

        let tolerance = target.abs() * f32::EPSILON / 0.002 + 1e-4;
        let diff = (param.get() - target).abs();
        prop_assert!(
            diff < tolerance,
            "initial={}, target={}, got={}, diff={}",
            initial, target, param.get(), diff
        );
    }
}
