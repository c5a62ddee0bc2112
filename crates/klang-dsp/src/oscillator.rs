//! Phase-accumulator oscillators.
//!
//! Configuration and state are split: configs are plain value structs the
//! control context edits, states live per voice and are owned by the
//! audio context. [`NoteOscillatorConfig`] layers LFO modulation on top
//! of the base parameters and is re-derived once per output sample;
//! [`LfoOscillatorConfig`] is the global low-frequency oscillator, whose
//! pitch is kept in log2 Hz so the UI can step it in cents.

use libm::{exp2f, floorf};

use crate::noise::{NoiseTables, XorShift32};
use crate::wave::{self, Waveform};

/// Shared oscillator parameters consumed by the waveform generators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorConfig {
    /// Disabled oscillators contribute nothing and cost nothing.
    pub enabled: bool,
    /// Waveform selector.
    pub waveform: Waveform,
    /// Pulse width (or generic wave parameter) in [0, 1].
    pub width: f32,
    /// Frequency as a linear multiplier of the voice's key frequency.
    pub frequency: f32,
    /// Output amplitude.
    pub amplitude: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            waveform: Waveform::Sine,
            width: 0.5,
            frequency: 1.0,
            amplitude: 1.0,
        }
    }
}

/// A note oscillator: base parameters plus LFO modulation depths.
///
/// The derived values inside [`base`](Self::base) are recomputed from the
/// bases once per output sample by [`modulate`](Self::modulate); the
/// bases are what the control context edits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteOscillatorConfig {
    /// Derived audio-rate values (width, frequency, amplitude).
    pub base: OscillatorConfig,
    /// Wave parameter before modulation.
    pub width_base: f32,
    /// Pitch offset in log2 octaves relative to the key frequency.
    pub frequency_base: f32,
    /// Amplitude before modulation.
    pub amplitude_base: f32,
    /// LFO depth applied to the wave parameter.
    pub width_lfo: f32,
    /// LFO depth applied to pitch, in log2 octaves.
    pub frequency_lfo: f32,
    /// LFO depth applied to amplitude.
    pub amplitude_lfo: f32,
}

impl Default for NoteOscillatorConfig {
    fn default() -> Self {
        Self {
            base: OscillatorConfig::default(),
            width_base: 0.5,
            frequency_base: 0.0,
            amplitude_base: 1.0,
            width_lfo: 0.0,
            frequency_lfo: 0.0,
            amplitude_lfo: 0.0,
        }
    }
}

impl NoteOscillatorConfig {
    /// Recompute the derived width, frequency, and amplitude for the
    /// current LFO value.
    ///
    /// The pitch path is exponential (base and depth are octaves); the
    /// wave-type tuning correction folds in here so the generators never
    /// see it.
    #[inline]
    pub fn modulate(&mut self, lfo: f32) {
        self.base.width = self.width_base + self.width_lfo * lfo;
        self.base.frequency = exp2f(self.frequency_base + self.frequency_lfo * lfo)
            * self.base.waveform.frequency_adjust();
        self.base.amplitude = self.amplitude_base + self.amplitude_lfo * lfo;
    }
}

/// The global low-frequency oscillator's configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LfoOscillatorConfig {
    /// Derived values; amplitude stays 1, frequency is absolute Hz.
    pub base: OscillatorConfig,
    /// Rate in log2 Hz (0.0 is 1 Hz, 1.0 is 2 Hz, ...).
    pub frequency_base: f32,
}

impl LfoOscillatorConfig {
    /// Derive the linear rate from the logarithmic base.
    #[inline]
    pub fn refresh(&mut self) {
        self.base.frequency = exp2f(self.frequency_base);
    }
}

impl Default for LfoOscillatorConfig {
    fn default() -> Self {
        let mut config = Self {
            base: OscillatorConfig::default(),
            frequency_base: 0.0,
        };
        config.refresh();
        config
    }
}

/// Per-oscillator mutable state.
///
/// `phase` stays in [0, 1); `advance` counts the whole cycles crossed by
/// the most recent phase step until a table-driven generator folds them
/// into `index`. The noise generator state rides along so white noise is
/// deterministic per oscillator slot.
#[derive(Clone, Copy, Debug)]
pub struct OscillatorState {
    /// Phase position in [0, 1).
    pub phase: f32,
    /// LFSR table position for the poly waves.
    pub index: usize,
    /// Whole cycles crossed by the last step, not yet folded into `index`.
    pub advance: i32,
    pub(crate) rng: XorShift32,
}

impl OscillatorState {
    /// Fresh state at phase zero.
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            index: 0,
            advance: 0,
            rng: XorShift32::default(),
        }
    }

    /// Return to phase zero. The noise generator is left running.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.index = 0;
        self.advance = 0;
    }

    /// Compute the current sample without advancing.
    ///
    /// Used by waveform preview paths; `delta` is the phase step the
    /// anti-alias window is sized for.
    #[inline]
    pub fn compute(
        &mut self,
        config: &OscillatorConfig,
        tables: &NoiseTables,
        antialias: bool,
        delta: f32,
    ) -> f32 {
        config.amplitude * wave::compute(config, self, tables, antialias, delta.abs())
    }

    /// Advance by one sample and return the amplitude-scaled value.
    ///
    /// `frequency_scale` is the voice's key frequency in Hz (the config
    /// frequency is relative to it); `dt` is the sample interval.
    #[inline]
    pub fn update(
        &mut self,
        config: &OscillatorConfig,
        tables: &NoiseTables,
        antialias: bool,
        frequency_scale: f32,
        dt: f32,
    ) -> f32 {
        let delta = config.frequency * frequency_scale * dt;
        let value = self.compute(config, tables, antialias, delta);
        self.advance_phase(delta);
        value
    }

    /// Accumulate a phase step, wrapping into [0, 1).
    ///
    /// Handles negative deltas; whole-cycle crossings accumulate into
    /// `advance` with their sign.
    #[inline]
    pub fn advance_phase(&mut self, delta: f32) {
        let total = self.phase + delta;
        let wraps = floorf(total);
        self.phase = total - wraps;
        self.advance += wraps as i32;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            self.advance += 1;
        }
        if self.phase < 0.0 {
            self.phase = 0.0;
        }
    }
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self::new()
    }
}
