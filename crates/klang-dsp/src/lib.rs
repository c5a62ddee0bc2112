//! Klang DSP - signal primitives for the klang virtual-analog synthesizer
//!
//! This crate provides the per-voice signal chain building blocks:
//!
//! - [`NoiseTables`] - precomputed Atari POKEY linear-feedback-shift-register
//!   bit streams and their poly5-clocked cross-products
//! - [`Waveform`] - the eleven band-limited waveform generators with
//!   optional PolyBLEP anti-aliasing
//! - [`OscillatorState`] / [`NoteOscillatorConfig`] / [`LfoOscillatorConfig`] -
//!   phase-accumulator oscillators with LFO modulation of width, pitch, and
//!   amplitude
//! - [`EnvelopeState`] - four-stage ADSR generator with exponential-approach
//!   segments that terminate in finite time
//! - [`FilterState`] - resonant Moog-ladder filter with 2x oversampling and
//!   Oberheim-style stage mixing for 21 output modes
//! - parameter steppers for quantized linear and logarithmic edits
//!
//! # Example
//!
//! ```rust
//! use klang_dsp::{NoiseTables, NoteOscillatorConfig, OscillatorState, Waveform};
//!
//! let tables = NoiseTables::new();
//! let mut config = NoteOscillatorConfig::default();
//! config.base.waveform = Waveform::Sawtooth;
//! config.modulate(0.0);
//!
//! let mut state = OscillatorState::new();
//! // 440 Hz at 48 kHz
//! let sample = state.update(&config.base, &tables, true, 440.0, 1.0 / 48000.0);
//! assert!(sample.abs() <= 1.1);
//! ```
//!
//! # Realtime discipline
//!
//! Everything here is allocation-free after [`NoiseTables::new`]; the
//! per-sample paths never lock, allocate, or perform I/O. The crate is
//! `no_std` compatible (disable the default `std` feature).
//!
//! # Filter cores
//!
//! Two ladder cores coexist behind a compile-time switch: the default
//! improved-Moog core, and a Huovilainen nonlinear core selected by the
//! `nonlinear-moog` cargo feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod envelope;
pub mod filter;
pub mod math;
pub mod noise;
pub mod oscillator;
pub mod param;
pub mod polyblep;
pub mod wave;

// Re-export main types at crate root
pub use envelope::{ATTACK_BIAS, DECAY_BIAS, EnvelopeConfig, EnvelopeStage, EnvelopeState};
pub use filter::{FILTER_OVERSAMPLE, FilterConfig, FilterMode, FilterState};
pub use math::fast_tanh;
pub use noise::{NoiseTables, XorShift32};
pub use oscillator::{LfoOscillatorConfig, NoteOscillatorConfig, OscillatorConfig, OscillatorState};
pub use param::{StepSize, step_exponential, step_linear, step_pitch};
pub use polyblep::{poly_blep, poly_blep_integrated};
pub use wave::Waveform;
