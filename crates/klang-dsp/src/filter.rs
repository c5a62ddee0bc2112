//! Resonant Moog-ladder filter with multimode output taps.
//!
//! The ladder is four one-pole low-pass stages with global negative
//! feedback. Two cores are available at compile time:
//!
//! - **Improved Moog** (default): each stage is the two-coefficient IIR
//!   `y[n] = b0*x[n] + b1*x[n-1] - a1*y[n-1]`, with the feedback signal
//!   saturated through `tanh` and half the input mixed back in to keep
//!   the passband level up at high resonance.
//! - **Nonlinear Moog** (`nonlinear-moog` feature): Antti Huovilainen's
//!   model with a `tanh` waveshaper on every stage and a polynomial
//!   tuning correction, decimated by averaging the last two oversampled
//!   outputs.
//!
//! Both cores run [`FILTER_OVERSAMPLE`] iterations per output sample.
//! After the ladder updates, the output is an Oberheim-style linear
//! combination of the stage values, which turns the single ladder into
//! 21 selectable responses (low-pass and high-pass at four slopes,
//! band-pass, notch, phase-shift, and their cascades).

use libm::expf;

use crate::math::fast_tanh;

/// Oversampled iterations per output sample.
pub const FILTER_OVERSAMPLE: usize = 2;

/// Filter response selector.
///
/// The numeric suffix is the slope order (1 = 6 dB/oct per pole). The
/// combined variants cascade a band-pass, notch, or phase-shift response
/// with additional low-pass or high-pass poles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Bypass: input is returned untouched and state does not advance.
    #[default]
    None,
    /// Input node after feedback; resonance alone shapes the sound.
    Peak,
    LowPass1,
    LowPass2,
    LowPass3,
    LowPass4,
    HighPass1,
    HighPass2,
    HighPass3,
    HighPass4,
    BandPass1,
    BandPass1LowPass1,
    BandPass1LowPass2,
    BandPass1HighPass1,
    BandPass1HighPass2,
    BandPass2,
    Notch,
    NotchLowPass1,
    NotchLowPass2,
    PhaseShift,
    PhaseShiftLowPass1,
}

/// All modes in menu order.
pub const FILTER_MODES: [FilterMode; 21] = [
    FilterMode::None,
    FilterMode::Peak,
    FilterMode::LowPass1,
    FilterMode::LowPass2,
    FilterMode::LowPass3,
    FilterMode::LowPass4,
    FilterMode::HighPass1,
    FilterMode::HighPass2,
    FilterMode::HighPass3,
    FilterMode::HighPass4,
    FilterMode::BandPass1,
    FilterMode::BandPass1LowPass1,
    FilterMode::BandPass1LowPass2,
    FilterMode::BandPass1HighPass1,
    FilterMode::BandPass1HighPass2,
    FilterMode::BandPass2,
    FilterMode::Notch,
    FilterMode::NotchLowPass1,
    FilterMode::NotchLowPass2,
    FilterMode::PhaseShift,
    FilterMode::PhaseShiftLowPass1,
];

impl FilterMode {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::None => "None",
            FilterMode::Peak => "Peak",
            FilterMode::LowPass1 => "Low-Pass 1",
            FilterMode::LowPass2 => "Low-Pass 2",
            FilterMode::LowPass3 => "Low-Pass 3",
            FilterMode::LowPass4 => "Low-Pass 4",
            FilterMode::HighPass1 => "High-Pass 1",
            FilterMode::HighPass2 => "High-Pass 2",
            FilterMode::HighPass3 => "High-Pass 3",
            FilterMode::HighPass4 => "High-Pass 4",
            FilterMode::BandPass1 => "Band-Pass 1",
            FilterMode::BandPass1LowPass1 => "Band-Pass 1 + Low-Pass 1",
            FilterMode::BandPass1LowPass2 => "Band-Pass 1 + Low-Pass 2",
            FilterMode::BandPass1HighPass1 => "Band-Pass 1 + High-Pass 1",
            FilterMode::BandPass1HighPass2 => "Band-Pass 1 + High-Pass 2",
            FilterMode::BandPass2 => "Band-Pass 2",
            FilterMode::Notch => "Notch",
            FilterMode::NotchLowPass1 => "Notch + Low-Pass 1",
            FilterMode::NotchLowPass2 => "Notch + Low-Pass 2",
            FilterMode::PhaseShift => "Phase Shift",
            FilterMode::PhaseShiftLowPass1 => "Phase Shift + Low-Pass 1",
        }
    }

    /// Stage-mix coefficients on (y0, y1, y2, y3, y4).
    ///
    /// High-pass combinations are binomial differences of successive
    /// stages; the cascaded variants are the same row shifted one or two
    /// stages down the ladder.
    pub fn mix_coefficients(self) -> [f32; 5] {
        match self {
            FilterMode::None => [0.0, 0.0, 0.0, 0.0, 0.0],
            FilterMode::Peak => [1.0, 0.0, 0.0, 0.0, 0.0],
            FilterMode::LowPass1 => [0.0, 1.0, 0.0, 0.0, 0.0],
            FilterMode::LowPass2 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::LowPass3 => [0.0, 0.0, 0.0, 1.0, 0.0],
            FilterMode::LowPass4 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::HighPass1 => [-1.0, 1.0, 0.0, 0.0, 0.0],
            FilterMode::HighPass2 => [-1.0, 2.0, -1.0, 0.0, 0.0],
            FilterMode::HighPass3 => [-1.0, 3.0, -3.0, 1.0, 0.0],
            FilterMode::HighPass4 => [-1.0, 4.0, -6.0, 4.0, -1.0],
            FilterMode::BandPass1 => [0.0, -1.0, 1.0, 0.0, 0.0],
            FilterMode::BandPass1LowPass1 => [0.0, 0.0, -1.0, 1.0, 0.0],
            FilterMode::BandPass1LowPass2 => [0.0, 0.0, 0.0, -1.0, 1.0],
            FilterMode::BandPass1HighPass1 => [0.0, -1.0, 2.0, -1.0, 0.0],
            FilterMode::BandPass1HighPass2 => [0.0, -1.0, 3.0, -3.0, 1.0],
            FilterMode::BandPass2 => [0.0, 0.0, 1.0, -2.0, 1.0],
            FilterMode::Notch => [-1.0, 2.0, -2.0, 0.0, 0.0],
            FilterMode::NotchLowPass1 => [0.0, -1.0, 2.0, -2.0, 0.0],
            FilterMode::NotchLowPass2 => [0.0, 0.0, -1.0, 2.0, -2.0],
            FilterMode::PhaseShift => [-1.0, 3.0, -6.0, 4.0, 0.0],
            FilterMode::PhaseShiftLowPass1 => [0.0, -1.0, 3.0, -6.0, 4.0],
        }
    }

    /// Stable index into [`FILTER_MODES`], for atomic parameter storage.
    pub fn index(self) -> u8 {
        FILTER_MODES.iter().position(|&m| m == self).unwrap_or(0) as u8
    }

    /// Inverse of [`index`](Self::index); out-of-range values map to None.
    pub fn from_index(index: u8) -> FilterMode {
        FILTER_MODES
            .get(index as usize)
            .copied()
            .unwrap_or(FilterMode::None)
    }

    /// Cycle to the next mode, wrapping.
    pub fn next(self) -> FilterMode {
        let i = FILTER_MODES.iter().position(|&m| m == self).unwrap_or(0);
        FILTER_MODES[(i + 1) % FILTER_MODES.len()]
    }

    /// Cycle to the previous mode, wrapping.
    pub fn prev(self) -> FilterMode {
        let i = FILTER_MODES.iter().position(|&m| m == self).unwrap_or(0);
        FILTER_MODES[(i + FILTER_MODES.len() - 1) % FILTER_MODES.len()]
    }
}

impl core::str::FromStr for FilterMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "none" | "off" => Ok(FilterMode::None),
            "peak" => Ok(FilterMode::Peak),
            "lp1" => Ok(FilterMode::LowPass1),
            "lp2" => Ok(FilterMode::LowPass2),
            "lp3" => Ok(FilterMode::LowPass3),
            "lp4" => Ok(FilterMode::LowPass4),
            "hp1" => Ok(FilterMode::HighPass1),
            "hp2" => Ok(FilterMode::HighPass2),
            "hp3" => Ok(FilterMode::HighPass3),
            "hp4" => Ok(FilterMode::HighPass4),
            "bp1" => Ok(FilterMode::BandPass1),
            "bp1lp1" => Ok(FilterMode::BandPass1LowPass1),
            "bp1lp2" => Ok(FilterMode::BandPass1LowPass2),
            "bp1hp1" => Ok(FilterMode::BandPass1HighPass1),
            "bp1hp2" => Ok(FilterMode::BandPass1HighPass2),
            "bp2" => Ok(FilterMode::BandPass2),
            "notch" => Ok(FilterMode::Notch),
            "notchlp1" => Ok(FilterMode::NotchLowPass1),
            "notchlp2" => Ok(FilterMode::NotchLowPass2),
            "phase" => Ok(FilterMode::PhaseShift),
            "phaselp1" => Ok(FilterMode::PhaseShiftLowPass1),
            _ => Err("unknown filter mode"),
        }
    }
}

/// Filter parameters.
///
/// Cutoff terms are log2 octaves relative to the voice's key frequency
/// (cutoff key-follow), so filter colour stays constant across pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterConfig {
    pub mode: FilterMode,
    /// Base cutoff offset in octaves.
    pub cutoff_base: f32,
    /// LFO depth on the cutoff, in octaves.
    pub cutoff_lfo: f32,
    /// Filter-envelope depth on the cutoff, in octaves.
    pub cutoff_env: f32,
    /// Feedback amount in [0, 4]; self-oscillates near the top.
    pub resonance: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::None,
            cutoff_base: 0.0,
            cutoff_lfo: 0.0,
            cutoff_env: 0.0,
            resonance: 0.0,
        }
    }
}

/// Per-voice ladder state.
///
/// `y[0]` is the input node after feedback, `y[1..=4]` the four stage
/// outputs. The remaining fields are coefficients refreshed by `setup`
/// each sample, so only `y` (and `ytan` for the nonlinear core) carry
/// history.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterState {
    feedback: f32,

    #[cfg(not(feature = "nonlinear-moog"))]
    a1: f32,
    #[cfg(not(feature = "nonlinear-moog"))]
    b0: f32,
    #[cfg(not(feature = "nonlinear-moog"))]
    b1: f32,

    #[cfg(feature = "nonlinear-moog")]
    tune: f32,
    #[cfg(feature = "nonlinear-moog")]
    ytan: [f32; 4],

    y: [f32; 5],
}

impl FilterState {
    /// Zero all state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Stage outputs, for display taps.
    pub fn stages(&self) -> [f32; 5] {
        self.y
    }

    /// Run one input sample through the ladder and return the value for
    /// the configured mode.
    ///
    /// `cutoff` is in Hz (already key-scaled and modulated); `dt` the
    /// output sample interval. Mode `None` bypasses entirely.
    #[inline]
    pub fn update(&mut self, config: &FilterConfig, cutoff: f32, input: f32, dt: f32) -> f32 {
        if config.mode == FilterMode::None {
            return input;
        }
        self.setup(cutoff, config.resonance, dt);
        let value = self.run(input, config.mode);
        // keep subnormals out of the recursive state
        for v in &mut self.y {
            if v.abs() < 1e-30 {
                *v = 0.0;
            }
        }
        value
    }

    /// Mix the stage outputs for a mode.
    #[inline]
    fn mix(&self, mode: FilterMode) -> f32 {
        let m = mode.mix_coefficients();
        m[0] * self.y[0] + m[1] * self.y[1] + m[2] * self.y[2] + m[3] * self.y[3] + m[4] * self.y[4]
    }

    /// Normalized cutoff against the oversampled Nyquist, capped at 1.
    #[inline]
    fn normalized_cutoff(cutoff: f32, dt: f32) -> f32 {
        let fc = cutoff * dt * 2.0 / FILTER_OVERSAMPLE as f32;
        if fc < 1.0 { fc } else { 1.0 }
    }

    #[cfg(not(feature = "nonlinear-moog"))]
    #[inline]
    fn setup(&mut self, cutoff: f32, resonance: f32, dt: f32) {
        let fc = Self::normalized_cutoff(cutoff, dt);
        let g = 1.0 - expf(-core::f32::consts::PI * fc);
        self.feedback = 4.0 * resonance;
        // per-stage IIR: y[n] = (g/1.3)*x[n] + (0.3*g/1.3)*x[n-1] - (g-1)*y[n-1]
        self.a1 = g - 1.0;
        self.b0 = g * 0.769231;
        self.b1 = self.b0 * 0.3;
    }

    #[cfg(not(feature = "nonlinear-moog"))]
    #[inline]
    fn run(&mut self, input: f32, mode: FilterMode) -> f32 {
        for _ in 0..FILTER_OVERSAMPLE {
            // saturated feedback, with half the input compensated back in
            let stage_in = input - self.feedback * (fast_tanh(self.y[4]) - 0.5 * input);
            let t = self.y;
            self.y[0] = stage_in;
            self.y[1] = self.b0 * self.y[0] + self.b1 * t[0] - self.a1 * self.y[1];
            self.y[2] = self.b0 * self.y[1] + self.b1 * t[1] - self.a1 * self.y[2];
            self.y[3] = self.b0 * self.y[2] + self.b1 * t[2] - self.a1 * self.y[3];
            self.y[4] = self.b0 * self.y[3] + self.b1 * t[3] - self.a1 * self.y[4];
        }
        self.mix(mode)
    }

    #[cfg(feature = "nonlinear-moog")]
    #[inline]
    fn setup(&mut self, cutoff: f32, resonance: f32, dt: f32) {
        let fc = Self::normalized_cutoff(cutoff, dt);
        // empirical tuning and resonance-compensation polynomials
        let fcr = ((1.8730 * fc + 0.4955) * fc - 0.6490) * fc + 0.9988;
        let acr = (-3.9364 * fc + 1.8409) * fc + 0.9968;
        self.feedback = 4.0 * resonance * acr;
        self.tune = (1.0 - expf(-core::f32::consts::PI * fc * fcr)) * 1.220_703_13;
    }

    #[cfg(feature = "nonlinear-moog")]
    #[inline]
    fn run(&mut self, input: f32, mode: FilterMode) -> f32 {
        let stage_in = input - self.feedback * self.y[4];
        let mut decimated = 0.0;
        for _ in 0..FILTER_OVERSAMPLE {
            let last = self.y[4];
            self.y[0] = stage_in;
            self.ytan[0] = fast_tanh(0.8192 * stage_in);
            self.y[1] += self.tune * (self.ytan[0] - self.ytan[1]);
            self.ytan[1] = fast_tanh(0.8192 * self.y[1]);
            self.y[2] += self.tune * (self.ytan[1] - self.ytan[2]);
            self.ytan[2] = fast_tanh(0.8192 * self.y[2]);
            self.y[3] += self.tune * (self.ytan[2] - self.ytan[3]);
            self.ytan[3] = fast_tanh(0.8192 * self.y[3]);
            self.y[4] += self.tune * (self.ytan[3] - fast_tanh(0.8192 * self.y[4]));
            decimated = 0.5 * (self.y[4] + last);
        }
        if mode == FilterMode::LowPass4 {
            decimated
        } else {
            self.mix(mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::{sinf, sqrtf};

    const SR: f32 = 48000.0;
    const DT: f32 = 1.0 / SR;

    fn lp4_config() -> FilterConfig {
        FilterConfig {
            mode: FilterMode::LowPass4,
            ..FilterConfig::default()
        }
    }

    #[test]
    fn mode_none_is_identity() {
        let config = FilterConfig::default();
        let mut state = FilterState::default();
        for i in 0..100 {
            let input = sinf(i as f32 * 0.1) * 2.0;
            assert_eq!(state.update(&config, 1000.0, input, DT), input);
        }
        // state untouched
        assert_eq!(state.stages(), [0.0; 5]);
    }

    #[test]
    fn lowpass4_dc_convergence() {
        let config = lp4_config();
        let mut state = FilterState::default();
        let mut out = 0.0;
        for _ in 0..48000 {
            out = state.update(&config, 1000.0, 1.0, DT);
        }
        assert!((out - 1.0).abs() < 0.01, "DC settled at {out}");
    }

    #[test]
    fn highpass4_blocks_dc() {
        let config = FilterConfig {
            mode: FilterMode::HighPass4,
            ..FilterConfig::default()
        };
        let mut state = FilterState::default();
        let mut out = 1.0;
        for _ in 0..48000 {
            out = state.update(&config, 1000.0, 1.0, DT);
        }
        assert!(out.abs() < 0.01, "DC leaked through HP4: {out}");
    }

    /// Steady-state RMS gain for a sine probe through a fresh LP4.
    fn lp4_gain_at(freq: f32) -> f32 {
        let config = lp4_config();
        let mut state = FilterState::default();
        let warmup = 4800;
        let measure = 9600;
        let mut sum_sq = 0.0f64;
        for i in 0..(warmup + measure) {
            let input = sinf(core::f32::consts::TAU * freq * i as f32 * DT);
            let out = state.update(&config, 1000.0, input, DT);
            if i >= warmup {
                sum_sq += (out as f64) * (out as f64);
            }
        }
        sqrtf((sum_sq / measure as f64) as f32)
    }

    #[test]
    fn lowpass4_rolloff() {
        let low = lp4_gain_at(100.0);
        let high = lp4_gain_at(10000.0);
        let db = 20.0 * libm::log10f(high / low.max(1e-12));
        assert!(db <= -60.0, "10 kHz only {db:.1} dB below 100 Hz");
    }

    #[test]
    fn output_finite_across_parameter_grid() {
        for mode in FILTER_MODES {
            for &resonance in &[0.0, 1.0, 2.5, 4.0] {
                for &cutoff in &[20.0, 1000.0, 20000.0, 96000.0] {
                    let config = FilterConfig {
                        mode,
                        resonance,
                        ..FilterConfig::default()
                    };
                    let mut state = FilterState::default();
                    for i in 0..2000 {
                        let input = sinf(i as f32 * 0.3);
                        let out = state.update(&config, cutoff, input, DT);
                        assert!(
                            out.is_finite(),
                            "{mode:?} res={resonance} cutoff={cutoff} diverged at {i}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn cutoff_clamps_at_oversampled_nyquist() {
        assert_eq!(FilterState::normalized_cutoff(1.0e9, DT), 1.0);
        let fc = FilterState::normalized_cutoff(12000.0, DT);
        assert!((fc - 0.25).abs() < 1e-6);
    }

    #[test]
    fn clear_zeroes_state() {
        let config = lp4_config();
        let mut state = FilterState::default();
        for _ in 0..100 {
            state.update(&config, 1000.0, 1.0, DT);
        }
        assert!(state.stages().iter().any(|&v| v != 0.0));
        state.clear();
        assert_eq!(state.stages(), [0.0; 5]);
    }

    #[test]
    fn resonance_boosts_cutoff_region() {
        // a sine at the cutoff should come through hotter with resonance
        let probe = |resonance: f32| {
            let config = FilterConfig {
                mode: FilterMode::LowPass4,
                resonance,
                ..FilterConfig::default()
            };
            let mut state = FilterState::default();
            let freq = 1000.0;
            let mut sum_sq = 0.0f64;
            for i in 0..19200 {
                let input = sinf(core::f32::consts::TAU * freq * i as f32 * DT);
                let out = state.update(&config, 1000.0, input, DT);
                if i >= 9600 {
                    sum_sq += (out as f64) * (out as f64);
                }
            }
            sum_sq
        };
        let flat = probe(0.0);
        let resonant = probe(2.0);
        assert!(
            resonant > flat * 1.5,
            "resonance did not boost: {resonant} vs {flat}"
        );
    }

    #[test]
    fn mode_cycling_covers_all() {
        let mut mode = FilterMode::None;
        for _ in 0..FILTER_MODES.len() {
            mode = mode.next();
        }
        assert_eq!(mode, FilterMode::None);
        assert_eq!(FilterMode::None.prev(), FilterMode::PhaseShiftLowPass1);
    }

    #[test]
    fn mode_names_and_parsing() {
        for mode in FILTER_MODES {
            assert!(!mode.name().is_empty());
        }
        assert_eq!("lp4".parse::<FilterMode>(), Ok(FilterMode::LowPass4));
        assert_eq!("notch".parse::<FilterMode>(), Ok(FilterMode::Notch));
        assert!("bogus".parse::<FilterMode>().is_err());
    }
}
