//! Property-based tests for the DSP primitives.
//!
//! Randomized checks of the waveform, oscillator, envelope, and PolyBLEP
//! contracts: output bounds, Nyquist silence, phase normalization,
//! envelope range, and kernel symmetries.

use std::sync::OnceLock;

use proptest::prelude::*;

use klang_dsp::{
    EnvelopeConfig, EnvelopeState, NoiseTables, OscillatorConfig, OscillatorState, Waveform,
    poly_blep, wave,
};

fn tables() -> &'static NoiseTables {
    static TABLES: OnceLock<NoiseTables> = OnceLock::new();
    TABLES.get_or_init(NoiseTables::new)
}

fn any_waveform() -> impl Strategy<Value = Waveform> {
    prop::sample::select(wave::WAVEFORMS.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every waveform stays within [-1, 1] plus the PolyBLEP overshoot
    /// allowance for any step up to Nyquist.
    #[test]
    fn waveform_output_bounded(
        waveform in any_waveform(),
        width in 0.0f32..=1.0f32,
        step in 0.0001f32..=0.5f32,
        antialias in any::<bool>(),
        start_phase in 0.0f32..1.0f32,
    ) {
        let tables = tables();
        let config = OscillatorConfig {
            waveform,
            width,
            ..OscillatorConfig::default()
        };
        let mut state = OscillatorState::new();
        state.phase = start_phase;
        for _ in 0..256 {
            let v = wave::compute(&config, &mut state, tables, antialias, step);
            prop_assert!(
                v.abs() <= 1.1,
                "{:?} width={} step={} aa={} produced {}",
                waveform, width, step, antialias, v
            );
            state.advance_phase(step);
        }
    }

    /// Steps beyond Nyquist are exactly silent for every waveform.
    #[test]
    fn waveform_silent_beyond_nyquist(
        waveform in any_waveform(),
        step in 0.5001f32..=100.0f32,
        phase in 0.0f32..1.0f32,
    ) {
        let tables = tables();
        let config = OscillatorConfig {
            waveform,
            ..OscillatorConfig::default()
        };
        let mut state = OscillatorState::new();
        state.phase = phase;
        prop_assert_eq!(wave::compute(&config, &mut state, tables, true, step), 0.0);
    }

    /// Phase stays normalized in [0, 1) under arbitrary positive and
    /// negative deltas.
    #[test]
    fn phase_normalized_after_update(
        deltas in prop::collection::vec(-10.0f32..10.0f32, 1..200),
    ) {
        let mut state = OscillatorState::new();
        for delta in deltas {
            state.advance_phase(delta);
            prop_assert!(
                (0.0..1.0).contains(&state.phase),
                "phase {} after delta {}",
                state.phase, delta
            );
        }
    }

    /// Envelope amplitude stays in [0, 1] and is zero exactly in Off,
    /// across random configurations and gate timings.
    #[test]
    fn envelope_amplitude_in_range(
        attack in 1.0f32..100000.0f32,
        decay in 1.0f32..100000.0f32,
        sustain in 0.0f32..=1.0f32,
        release in 1.0f32..100000.0f32,
        gate_off_at in 1usize..4000,
    ) {
        let config = EnvelopeConfig {
            attack_rate: attack,
            decay_rate: decay,
            sustain_level: sustain,
            release_rate: release,
        };
        let mut env = EnvelopeState::default();
        env.gate_on();
        for i in 0..8000 {
            let a = env.advance(&config, 1.0 / 48000.0);
            prop_assert!((0.0..=1.0).contains(&a), "amplitude {} at {}", a, i);
            prop_assert_eq!(
                !env.is_active(),
                a == 0.0,
                "Off/zero invariant broken at {}", i
            );
            if i == gate_off_at {
                env.gate_off();
            }
        }
    }

    /// PolyBLEP kernel identities: zero at the edge and outside the
    /// window, odd inside it.
    #[test]
    fn poly_blep_identities(
        w in 0.0001f32..=1.0f32,
        frac in 0.0f32..=1.0f32,
    ) {
        prop_assert_eq!(poly_blep(0.0, w), 0.0);
        prop_assert_eq!(poly_blep(w, w), 0.0);
        prop_assert_eq!(poly_blep(-w, w), 0.0);
        let t = w * frac;
        let fwd = poly_blep(t, w);
        let bwd = poly_blep(-t, w);
        prop_assert!((fwd + bwd).abs() < 1e-5, "odd symmetry: {} vs {}", fwd, bwd);
    }

    /// The amplitude knob scales the oscillator output linearly.
    #[test]
    fn amplitude_scales_output(
        amplitude in 0.0f32..=2.0f32,
        phase in 0.0f32..1.0f32,
    ) {
        let tables = tables();
        let mut config = OscillatorConfig::default();
        config.amplitude = amplitude;
        let mut state = OscillatorState::new();
        state.phase = phase;
        let scaled = state.compute(&config, tables, false, 0.01);

        config.amplitude = 1.0;
        let mut reference = OscillatorState::new();
        reference.phase = phase;
        let unit = reference.compute(&config, tables, false, 0.01);

        prop_assert!((scaled - unit * amplitude).abs() < 1e-5);
    }
}

#[test]
fn noise_tables_have_maximal_periods() {
    let tables = tables();
    // lengths are 2^n - 1
    assert_eq!(tables.poly4.len(), (1 << 4) - 1);
    assert_eq!(tables.poly5.len(), (1 << 5) - 1);
    assert_eq!(tables.poly17.len(), (1 << 17) - 1);

    // no proper-divisor period in the small tables
    let has_period = |bits: &[u8], period: usize| {
        bits.iter()
            .enumerate()
            .all(|(i, &b)| b == bits[(i + period) % bits.len()])
    };
    for d in [1, 3, 5] {
        assert!(!has_period(&tables.poly4, d), "poly4 has period {d}");
    }
    assert!(!has_period(&tables.poly5, 1));
    assert!(!has_period(&tables.poly17, 1));
}
