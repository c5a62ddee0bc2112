//! Quantized parameter edit helpers.
//!
//! The control surface adjusts every patch parameter with arrow keys,
//! scaled by modifier keys. Linear percent-style parameters move in
//! 1/256 ticks, pitch-style parameters in cents, and envelope rates by
//! doubling. All steppers clamp to caller-supplied bounds and are pure,
//! so the control context can apply them to a loaded value and write the
//! result straight back to the shared store.

/// Modifier-key step scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepSize {
    /// Alt: finest adjustment.
    Tiny,
    /// Ctrl: fine adjustment.
    Small,
    /// No modifier.
    #[default]
    Normal,
    /// Shift: coarse adjustment.
    Large,
}

impl StepSize {
    /// Step in cents for logarithmic frequency parameters.
    fn cents(self) -> f32 {
        match self {
            StepSize::Tiny => 1.0,
            StepSize::Small => 10.0,
            StepSize::Normal => 100.0,
            StepSize::Large => 1200.0,
        }
    }

    /// Step in 1/256 ticks for linear parameters.
    fn ticks(self) -> f32 {
        match self {
            StepSize::Tiny => 1.0,
            StepSize::Small => 4.0,
            StepSize::Normal => 16.0,
            StepSize::Large => 64.0,
        }
    }
}

/// Step a linear parameter by `sign` ticks of the given size.
#[inline]
pub fn step_linear(value: f32, sign: i32, size: StepSize, min: f32, max: f32) -> f32 {
    (value + sign as f32 * size.ticks() / 256.0).clamp(min, max)
}

/// Step a log2-octave pitch parameter by `sign` steps of the given size.
#[inline]
pub fn step_pitch(value: f32, sign: i32, size: StepSize, min: f32, max: f32) -> f32 {
    (value + sign as f32 * size.cents() / 1200.0).clamp(min, max)
}

/// Step a rate-style parameter by doubling or halving.
#[inline]
pub fn step_exponential(value: f32, sign: i32, min: f32, max: f32) -> f32 {
    let scaled = if sign >= 0 { value * 2.0 } else { value * 0.5 };
    scaled.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_steps_are_ticks() {
        let v = step_linear(0.5, 1, StepSize::Tiny, 0.0, 1.0);
        assert!((v - (0.5 + 1.0 / 256.0)).abs() < 1e-6);
        let v = step_linear(0.5, -1, StepSize::Small, 0.0, 1.0);
        assert!((v - (0.5 - 4.0 / 256.0)).abs() < 1e-6);
        let v = step_linear(0.5, 1, StepSize::Normal, 0.0, 1.0);
        assert!((v - (0.5 + 16.0 / 256.0)).abs() < 1e-6);
        let v = step_linear(0.5, 1, StepSize::Large, 0.0, 1.0);
        assert!((v - 0.75).abs() < 1e-6);
    }

    #[test]
    fn linear_clamps() {
        assert_eq!(step_linear(0.99, 1, StepSize::Large, 0.0, 1.0), 1.0);
        assert_eq!(step_linear(0.01, -1, StepSize::Large, 0.0, 1.0), 0.0);
    }

    #[test]
    fn pitch_steps_in_cents() {
        // a Large step is one full octave
        let v = step_pitch(0.0, 1, StepSize::Large, -4.0, 4.0);
        assert!((v - 1.0).abs() < 1e-6);
        // a Normal step is a semitone
        let v = step_pitch(0.0, 1, StepSize::Normal, -4.0, 4.0);
        assert!((v - 100.0 / 1200.0).abs() < 1e-6);
        // a Tiny step is one cent
        let v = step_pitch(0.0, -1, StepSize::Tiny, -4.0, 4.0);
        assert!((v + 1.0 / 1200.0).abs() < 1e-6);
    }

    #[test]
    fn pitch_clamps() {
        assert_eq!(step_pitch(3.5, 1, StepSize::Large, -4.0, 4.0), 4.0);
        assert_eq!(step_pitch(-3.5, -1, StepSize::Large, -4.0, 4.0), -4.0);
    }

    #[test]
    fn exponential_doubles_and_halves() {
        assert_eq!(step_exponential(16.0, 1, 0.25, 65536.0), 32.0);
        assert_eq!(step_exponential(16.0, -1, 0.25, 65536.0), 8.0);
        assert_eq!(step_exponential(65536.0, 1, 0.25, 65536.0), 65536.0);
        assert_eq!(step_exponential(0.25, -1, 0.25, 65536.0), 0.25);
    }
}
