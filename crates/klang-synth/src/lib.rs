//! Klang Synth - the polyphonic rendering engine
//!
//! This crate assembles the primitives from `klang-dsp` into a playable
//! instrument:
//!
//! - [`Voice`] - the per-key bundle of oscillator, envelope, and filter
//!   state; 24 voices keyed by physical key index
//! - [`SharedParams`] - the process-wide parameter store, shared between
//!   the control context and the audio context through relaxed atomics
//! - [`Engine`] - the sample loop: LFO, per-voice envelopes, oscillators,
//!   ladder filter, summing, soft saturation, stereo int16 output
//! - [`keyboard`] - the fixed 24-key frequency table and octave shifting
//!
//! # Threading model
//!
//! Two contexts touch the shared state: the audio callback (owns the
//! [`Engine`], reads parameters, writes voice state and the display
//! snapshot) and the control loop (writes parameters and gate flags,
//! reads the snapshot). Every shared field is an independent relaxed
//! atomic scalar; a torn read of one parameter costs at most one sample
//! of slightly wrong output, and the audio path never blocks, locks, or
//! allocates.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use klang_synth::{Engine, SharedParams};
//!
//! let params = Arc::new(SharedParams::default());
//! let mut engine = Engine::new(48000.0, Arc::clone(&params));
//!
//! params.set_gate(9, true); // A above middle C
//! let mut buffer = [0i16; 512];
//! engine.render(&mut buffer);
//! assert!(buffer.iter().any(|&s| s != 0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod engine;
pub mod keyboard;
pub mod shared;
pub mod voice;

pub use engine::Engine;
pub use keyboard::{KEY_COUNT, OCTAVE_DEFAULT, OCTAVE_MAX, OCTAVE_MIN};
pub use shared::{AtomicF32, SharedParams};
pub use voice::{OSC_COUNT, Voice};

// Re-export the DSP types callers configure the engine with
pub use klang_dsp::{
    EnvelopeConfig, EnvelopeStage, EnvelopeState, FilterConfig, FilterMode, FilterState,
    LfoOscillatorConfig, NoiseTables, NoteOscillatorConfig, OscillatorConfig, OscillatorState,
    StepSize, Waveform,
};
