//! Waveform generators.
//!
//! Each generator maps `(config, state, step)` to a sample in [-1, 1],
//! where `step` is the magnitude of the phase advance since the previous
//! sample. Generators never touch `state.phase` (the oscillator owns the
//! accumulator); the table-driven poly waves consume `state.advance` and
//! move `state.index`. A step above 0.5 has crossed Nyquist and yields
//! silence rather than an alias.
//!
//! Anti-aliasing is PolyBLEP-based and switchable at runtime: pulse and
//! sawtooth correct their amplitude steps, triangle corrects its slope
//! corners with the integrated kernel, and the poly waves scan the bit
//! table for transitions inside the correction window.

use core::f32::consts::TAU;
use libm::{floorf, sinf};

use crate::noise::{
    NoiseTables, POLY4_LEN, POLY4_POLY5_LEN, POLY5_LEN, POLY17_LEN, POLY17_POLY5_LEN,
    PULSE_POLY5_LEN,
};
use crate::oscillator::{OscillatorConfig, OscillatorState};
use crate::polyblep::{poly_blep, poly_blep_integrated};

/// Correction window half-width as a multiple of the phase step.
const POLYBLEP_WIDTH: f32 = 1.5;

/// Oscillator wave types.
///
/// The first five are the classic analog shapes; the rest reproduce the
/// Atari POKEY distortion settings from its LFSR noise generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure fundamental.
    #[default]
    Sine,
    /// Variable-width pulse; width 0.5 is a square wave.
    Pulse,
    /// Descending ramp, all harmonics.
    Sawtooth,
    /// Odd harmonics with 1/k^2 rolloff.
    Triangle,
    /// White noise from a XorShift32 generator.
    Noise,
    /// 4-bit LFSR tone (POKEY AUDC 12).
    Poly4,
    /// 5-bit LFSR tone.
    Poly5,
    /// 17-bit LFSR noise (POKEY AUDC 8).
    Poly17,
    /// Pulse clocked by poly5 (POKEY AUDC 2, 6).
    PulsePoly5,
    /// Poly4 clocked by poly5 (POKEY AUDC 4).
    Poly4Poly5,
    /// Poly17 clocked by poly5 (POKEY AUDC 0).
    Poly17Poly5,
}

/// All variants in menu order.
pub const WAVEFORMS: [Waveform; 11] = [
    Waveform::Sine,
    Waveform::Pulse,
    Waveform::Sawtooth,
    Waveform::Triangle,
    Waveform::Noise,
    Waveform::Poly4,
    Waveform::Poly5,
    Waveform::Poly17,
    Waveform::PulsePoly5,
    Waveform::Poly4Poly5,
    Waveform::Poly17Poly5,
];

impl Waveform {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Pulse => "Pulse",
            Waveform::Sawtooth => "Sawtooth",
            Waveform::Triangle => "Triangle",
            Waveform::Noise => "Noise",
            Waveform::Poly4 => "Poly4",
            Waveform::Poly5 => "Poly5",
            Waveform::Poly17 => "Poly17",
            Waveform::PulsePoly5 => "Pulse/Poly5",
            Waveform::Poly4Poly5 => "Poly4/Poly5",
            Waveform::Poly17Poly5 => "Poly17/Poly5",
        }
    }

    /// Multiplicative tuning correction applied to the key frequency.
    ///
    /// Short-period poly waves are retuned so their perceived pitch lines
    /// up with the keyboard, and all poly waves are raised an octave.
    pub fn frequency_adjust(self) -> f32 {
        match self {
            Waveform::Sine
            | Waveform::Pulse
            | Waveform::Sawtooth
            | Waveform::Triangle
            | Waveform::Noise => 1.0,
            Waveform::Poly4 => 2.0 * 15.0 / 16.0,
            Waveform::Poly5 => 2.0 * 31.0 / 32.0,
            Waveform::Poly17 => 2.0,
            Waveform::PulsePoly5 => 2.0 * 31.0 / 32.0,
            Waveform::Poly4Poly5 => 2.0 * 465.0 / 512.0,
            Waveform::Poly17Poly5 => 2.0,
        }
    }

    /// Phase cycles before the table index wraps.
    ///
    /// Returns 1 for the continuous waves, meaning "not table-driven":
    /// one visual period is one phase period and the index never moves.
    pub fn loop_cycle(self) -> usize {
        match self {
            Waveform::Sine
            | Waveform::Pulse
            | Waveform::Sawtooth
            | Waveform::Triangle
            | Waveform::Noise => 1,
            Waveform::Poly4 => POLY4_LEN,
            Waveform::Poly5 => POLY5_LEN,
            Waveform::Poly17 => POLY17_LEN,
            Waveform::PulsePoly5 => PULSE_POLY5_LEN,
            Waveform::Poly4Poly5 => POLY4_POLY5_LEN,
            Waveform::Poly17Poly5 => POLY17_POLY5_LEN,
        }
    }

    /// True for the LFSR table waves.
    pub fn is_table_driven(self) -> bool {
        self.loop_cycle() > 1
    }

    /// Stable index into [`WAVEFORMS`], for atomic parameter storage.
    pub fn index(self) -> u8 {
        WAVEFORMS.iter().position(|&w| w == self).unwrap_or(0) as u8
    }

    /// Inverse of [`index`](Self::index); out-of-range values map to Sine.
    pub fn from_index(index: u8) -> Waveform {
        WAVEFORMS
            .get(index as usize)
            .copied()
            .unwrap_or(Waveform::Sine)
    }

    /// Cycle to the next variant, wrapping.
    pub fn next(self) -> Waveform {
        let i = WAVEFORMS.iter().position(|&w| w == self).unwrap_or(0);
        WAVEFORMS[(i + 1) % WAVEFORMS.len()]
    }

    /// Cycle to the previous variant, wrapping.
    pub fn prev(self) -> Waveform {
        let i = WAVEFORMS.iter().position(|&w| w == self).unwrap_or(0);
        WAVEFORMS[(i + WAVEFORMS.len() - 1) % WAVEFORMS.len()]
    }
}

impl core::str::FromStr for Waveform {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "sine" => Ok(Waveform::Sine),
            "pulse" => Ok(Waveform::Pulse),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "noise" => Ok(Waveform::Noise),
            "poly4" => Ok(Waveform::Poly4),
            "poly5" => Ok(Waveform::Poly5),
            "poly17" => Ok(Waveform::Poly17),
            "pulsepoly5" => Ok(Waveform::PulsePoly5),
            "poly4poly5" => Ok(Waveform::Poly4Poly5),
            "poly17poly5" => Ok(Waveform::Poly17Poly5),
            _ => Err("unknown waveform"),
        }
    }
}

/// Compute one sample for the configured waveform.
///
/// `step` must be non-negative (callers pass the magnitude of the phase
/// delta); a step above 0.5 returns 0.
pub fn compute(
    config: &OscillatorConfig,
    state: &mut OscillatorState,
    tables: &NoiseTables,
    antialias: bool,
    step: f32,
) -> f32 {
    if step > 0.5 {
        return 0.0;
    }
    match config.waveform {
        Waveform::Sine => sinf(TAU * state.phase),
        Waveform::Pulse => pulse(state.phase, config.width, antialias, step),
        Waveform::Sawtooth => sawtooth(state.phase, antialias, step),
        Waveform::Triangle => triangle(state.phase, antialias, step),
        Waveform::Noise => state.rng.next_bipolar(),
        Waveform::Poly4 => poly(&tables.poly4, state, antialias, step),
        Waveform::Poly5 => poly(&tables.poly5, state, antialias, step),
        Waveform::Poly17 => poly(&tables.poly17, state, antialias, step),
        Waveform::PulsePoly5 => poly(&tables.pulsepoly5, state, antialias, step),
        Waveform::Poly4Poly5 => poly(&tables.poly4poly5, state, antialias, step),
        Waveform::Poly17Poly5 => poly(&tables.poly17poly5, state, antialias, step),
    }
}

/// Pulse with variable width.
///
/// Corrects both edges in the current and adjacent cycles: the rising
/// edge lives at phase 0 (and 1), the falling edge at `width` shifted by
/// one whole cycle in either direction. At width 0 or 1 the paired sites
/// cancel exactly, leaving the constant rail.
fn pulse(phase: f32, width: f32, antialias: bool, step: f32) -> f32 {
    let mut value = if phase < width { 1.0 } else { -1.0 };
    if antialias {
        let w = (step * POLYBLEP_WIDTH).min(1.0);
        value += poly_blep(phase, w);
        value += poly_blep(phase - 1.0, w);
        value -= poly_blep(phase - width, w);
        value -= poly_blep(phase - width + 1.0, w);
        value -= poly_blep(phase - width - 1.0, w);
    }
    value
}

/// Descending sawtooth `1 - 2*phase` with its rising wrap corrected.
fn sawtooth(phase: f32, antialias: bool, step: f32) -> f32 {
    let mut value = 1.0 - 2.0 * phase;
    if antialias {
        let w = (step * POLYBLEP_WIDTH).min(1.0);
        value += poly_blep(phase, w);
        value += poly_blep(phase - 1.0, w);
    }
    value
}

/// Triangle with integrated-PolyBLEP corner rounding.
///
/// Slope flips downward at phase 0.25 and upward at 0.75; each corner is
/// corrected in the current cycle and the one adjacent cycle that can
/// fall inside the window (w never exceeds 0.75, so farther corners
/// cannot contribute).
fn triangle(phase: f32, antialias: bool, step: f32) -> f32 {
    let mut value = (2.0 - (4.0 * phase - 1.0).abs()).abs() - 1.0;
    if antialias {
        let w = (step * POLYBLEP_WIDTH).min(1.0);
        value -= poly_blep_integrated(phase - 0.25, w);
        value -= poly_blep_integrated(phase - 1.25, w);
        value += poly_blep_integrated(phase - 0.75, w);
        value += poly_blep_integrated(phase + 0.25, w);
    }
    value
}

#[inline]
fn bit_to_sample(bit: u8) -> f32 {
    if bit != 0 { 1.0 } else { -1.0 }
}

/// Shared LFSR table generator.
///
/// Folds the whole-cycle crossings accumulated by the phase advance into
/// the table index, emits the current bit as +/-1, then corrects every
/// bit transition within the +/-w window around the play position. The
/// window may span several table entries at high pitch, so it is capped
/// at 8 cycles rather than 1.
fn poly(table: &[u8], state: &mut OscillatorState, antialias: bool, step: f32) -> f32 {
    let cycle = table.len();
    if state.advance != 0 {
        state.index =
            (state.index as i64 + state.advance as i64).rem_euclid(cycle as i64) as usize;
        state.advance = 0;
    }

    let mut value = bit_to_sample(table[state.index]);

    if antialias {
        let w = (step * POLYBLEP_WIDTH).min(8.0);
        let back = floorf(state.phase - w) as i32;
        let ahead = floorf(state.phase + w) as i32;
        if back < ahead {
            let mut i = (state.index as i64 + back as i64).rem_euclid(cycle as i64) as usize;
            let mut t = state.phase - back as f32;
            let mut prev = table[i];
            for _ in back..ahead {
                i += 1;
                if i == cycle {
                    i = 0;
                }
                t -= 1.0;
                let cur = table[i];
                if cur != prev {
                    value += (cur as f32 - prev as f32) * poly_blep(t, w);
                }
                prev = cur;
            }
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::OscillatorConfig;

    fn config_for(waveform: Waveform) -> OscillatorConfig {
        OscillatorConfig {
            waveform,
            ..OscillatorConfig::default()
        }
    }

    #[test]
    fn all_waveforms_bounded() {
        let tables = NoiseTables::new();
        for &waveform in &WAVEFORMS {
            for &antialias in &[false, true] {
                let config = config_for(waveform);
                let mut state = OscillatorState::new();
                for &step in &[0.001, 0.01, 0.1, 0.3, 0.5] {
                    for _ in 0..2000 {
                        let v = compute(&config, &mut state, &tables, antialias, step);
                        assert!(
                            v.abs() <= 1.1,
                            "{:?} (aa={antialias}, step={step}) out of range: {v}",
                            waveform
                        );
                        state.advance_phase(step);
                    }
                }
            }
        }
    }

    #[test]
    fn beyond_nyquist_is_silent() {
        let tables = NoiseTables::new();
        for &waveform in &WAVEFORMS {
            let config = config_for(waveform);
            let mut state = OscillatorState::new();
            state.phase = 0.3;
            for &step in &[0.5001, 0.75, 1.0, 10.0] {
                assert_eq!(
                    compute(&config, &mut state, &tables, true, step),
                    0.0,
                    "{:?} not silent at step {step}",
                    waveform
                );
            }
        }
    }

    #[test]
    fn sine_cardinal_points() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Sine);
        let mut state = OscillatorState::new();
        state.phase = 0.25;
        assert!((compute(&config, &mut state, &tables, true, 0.01) - 1.0).abs() < 1e-5);
        state.phase = 0.75;
        assert!((compute(&config, &mut state, &tables, true, 0.01) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn pulse_rails_at_extreme_widths() {
        let tables = NoiseTables::new();
        let mut config = config_for(Waveform::Pulse);
        let mut state = OscillatorState::new();

        config.width = 1.0;
        for i in 0..1000 {
            state.phase = i as f32 / 1000.0;
            let v = compute(&config, &mut state, &tables, true, 0.1);
            // paired correction sites cancel up to rounding
            assert!(
                (v - 1.0).abs() < 1e-5,
                "width=1 not constant at phase {}: {v}",
                state.phase
            );
        }

        config.width = 0.0;
        for i in 0..1000 {
            state.phase = i as f32 / 1000.0;
            let v = compute(&config, &mut state, &tables, true, 0.1);
            assert!(
                (v + 1.0).abs() < 1e-5,
                "width=0 not constant at phase {}: {v}",
                state.phase
            );
        }
    }

    #[test]
    fn pulse_mean_tracks_width() {
        let tables = NoiseTables::new();
        let mut config = config_for(Waveform::Pulse);
        for &width in &[0.1, 0.25, 0.5, 0.75, 0.9] {
            config.width = width;
            let mut state = OscillatorState::new();
            let step = 0.01;
            let n = 10_000;
            let mut sum = 0.0;
            for _ in 0..n {
                sum += compute(&config, &mut state, &tables, true, step);
                state.advance_phase(step);
            }
            let mean = sum / n as f32;
            let expected = 2.0 * width - 1.0;
            assert!(
                (mean - expected).abs() < 0.02,
                "width {width}: mean {mean}, expected {expected}"
            );
        }
    }

    #[test]
    fn square_is_symmetric() {
        let tables = NoiseTables::new();
        let mut config = config_for(Waveform::Pulse);
        config.width = 0.5;
        let mut state = OscillatorState::new();
        state.phase = 0.25;
        let high = compute(&config, &mut state, &tables, false, 0.01);
        state.phase = 0.75;
        let low = compute(&config, &mut state, &tables, false, 0.01);
        assert_eq!(high, 1.0);
        assert_eq!(low, -1.0);
    }

    #[test]
    fn sawtooth_endpoints() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Sawtooth);
        let mut state = OscillatorState::new();
        state.phase = 0.25;
        assert!((compute(&config, &mut state, &tables, false, 0.001) - 0.5).abs() < 1e-6);
        state.phase = 0.5;
        assert!(compute(&config, &mut state, &tables, false, 0.001).abs() < 1e-6);
    }

    #[test]
    fn triangle_shape() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Triangle);
        let mut state = OscillatorState::new();
        for (phase, expected) in [(0.0, 0.0), (0.25, 1.0), (0.5, 0.0), (0.75, -1.0)] {
            state.phase = phase;
            let v = compute(&config, &mut state, &tables, false, 0.001);
            assert!(
                (v - expected).abs() < 1e-6,
                "triangle({phase}) = {v}, expected {expected}"
            );
        }
    }

    #[test]
    fn triangle_antialias_rounds_corners() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Triangle);
        let mut state = OscillatorState::new();
        let step = 0.05;
        state.phase = 0.25;
        let naive = compute(&config, &mut state, &tables, false, step);
        state.phase = 0.25;
        let corrected = compute(&config, &mut state, &tables, true, step);
        assert!(
            corrected < naive,
            "corner should round down: {corrected} vs {naive}"
        );
    }

    #[test]
    fn poly_consumes_advance() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Poly4);
        let mut state = OscillatorState::new();
        state.advance = 3;
        compute(&config, &mut state, &tables, false, 0.1);
        assert_eq!(state.index, 3);
        assert_eq!(state.advance, 0);

        // negative advance wraps backwards
        state.advance = -5;
        compute(&config, &mut state, &tables, false, 0.1);
        assert_eq!(state.index, (3 + 15 - 5) % 15);
    }

    #[test]
    fn poly_emits_table_bits() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Poly5);
        let mut state = OscillatorState::new();
        for i in 0..POLY5_LEN {
            state.index = i;
            state.advance = 0;
            let v = compute(&config, &mut state, &tables, false, 0.1);
            assert_eq!(v, bit_to_sample(tables.poly5[i]));
        }
    }

    #[test]
    fn poly17_realigns_after_full_period() {
        let tables = NoiseTables::new();
        let config = config_for(Waveform::Poly17);
        let mut state = OscillatorState::new();
        // four samples per table entry: a full period is 4 * 131071 updates
        let step = 0.25;
        for _ in 0..4 * POLY17_LEN {
            compute(&config, &mut state, &tables, false, step);
            state.advance_phase(step);
        }
        compute(&config, &mut state, &tables, false, step);
        assert_eq!(state.index, 0);
        assert!(state.phase.abs() < 1e-3);
    }

    #[test]
    fn waveform_cycling_covers_all() {
        let mut w = Waveform::Sine;
        for _ in 0..WAVEFORMS.len() {
            w = w.next();
        }
        assert_eq!(w, Waveform::Sine);
        assert_eq!(Waveform::Sine.prev(), Waveform::Poly17Poly5);
    }

    #[test]
    fn loop_cycle_matches_tables() {
        let tables = NoiseTables::new();
        assert_eq!(Waveform::Sine.loop_cycle(), 1);
        assert_eq!(Waveform::Poly4.loop_cycle(), tables.poly4.len());
        assert_eq!(Waveform::Poly17Poly5.loop_cycle(), tables.poly17poly5.len());
        assert!(!Waveform::Noise.is_table_driven());
        assert!(Waveform::Poly5.is_table_driven());
    }
}
