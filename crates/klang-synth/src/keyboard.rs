//! Keyboard frequency table and octave shifting.
//!
//! The instrument exposes 24 keys across two QWERTY rows, two octaves
//! starting three semitones above A3, so key 9 (the A above middle C) is
//! 440 Hz at the default octave. Octave shifts scale every key frequency
//! by a power of two rather than re-tabulating.

use libm::exp2f;

/// Number of playable keys (and voices; allocation is keyed by key index).
pub const KEY_COUNT: usize = 24;

/// Lowest selectable octave.
pub const OCTAVE_MIN: i32 = 0;
/// Highest selectable octave.
pub const OCTAVE_MAX: i32 = 8;
/// Octave at which the table frequencies apply unscaled.
pub const OCTAVE_DEFAULT: i32 = 4;

/// Base frequency of a key: `2^((k + 3) / 12) * 220` Hz.
///
/// Key 0 is middle C (261.63 Hz), key 9 is A4 (440 Hz).
pub fn key_frequency(key: usize) -> f32 {
    exp2f((key as f32 + 3.0) / 12.0) * 220.0
}

/// The full precomputed table.
pub fn frequency_table() -> [f32; KEY_COUNT] {
    core::array::from_fn(key_frequency)
}

/// Frequency multiplier for an octave setting.
pub fn octave_timescale(octave: i32) -> f32 {
    exp2f((octave - OCTAVE_DEFAULT) as f32)
}
