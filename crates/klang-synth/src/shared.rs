//! The process-wide parameter store.
//!
//! One [`SharedParams`] instance is shared (via `Arc`) between the
//! control context, which edits patch parameters and toggles gates, and
//! the audio context, which reads everything once per sample. Every
//! field is an independent relaxed atomic scalar: no locks, no ordering
//! requirements between parameters, and a torn write is bounded by one
//! sample of wrong value because the derived values are recomputed every
//! sample anyway.
//!
//! The store also carries the display snapshot flowing the other way:
//! the engine publishes the latest LFO value, per-voice envelope stage,
//! and most recently started key for a UI collaborator to read.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU32, AtomicUsize, Ordering};

use klang_dsp::{
    EnvelopeConfig, EnvelopeStage, FilterConfig, FilterMode, LfoOscillatorConfig,
    NoteOscillatorConfig, Waveform,
};

use crate::keyboard::{KEY_COUNT, OCTAVE_DEFAULT, OCTAVE_MAX, OCTAVE_MIN, octave_timescale};

/// An `f32` stored in an `AtomicU32` with relaxed ordering.
///
/// Good enough for audio parameters: each load observes some value the
/// writer stored, and nothing on either side depends on cross-field
/// ordering.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// One note-oscillator slot's editable parameters.
#[derive(Debug)]
pub struct OscSlotParams {
    pub enabled: AtomicBool,
    waveform: AtomicU8,
    pub width_base: AtomicF32,
    /// Pitch offset in log2 octaves relative to the key.
    pub frequency_base: AtomicF32,
    pub amplitude_base: AtomicF32,
    pub width_lfo: AtomicF32,
    pub frequency_lfo: AtomicF32,
    pub amplitude_lfo: AtomicF32,
}

impl OscSlotParams {
    fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            waveform: AtomicU8::new(Waveform::Sine.index()),
            width_base: AtomicF32::new(0.5),
            frequency_base: AtomicF32::new(0.0),
            amplitude_base: AtomicF32::new(1.0),
            width_lfo: AtomicF32::new(0.0),
            frequency_lfo: AtomicF32::new(0.0),
            amplitude_lfo: AtomicF32::new(0.0),
        }
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load(Ordering::Relaxed))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index(), Ordering::Relaxed);
    }

    /// Snapshot into the value struct the generators consume.
    ///
    /// The derived fields are left for [`NoteOscillatorConfig::modulate`]
    /// to fill in once the current LFO value is known.
    pub fn load(&self) -> NoteOscillatorConfig {
        let mut config = NoteOscillatorConfig {
            width_base: self.width_base.get(),
            frequency_base: self.frequency_base.get(),
            amplitude_base: self.amplitude_base.get(),
            width_lfo: self.width_lfo.get(),
            frequency_lfo: self.frequency_lfo.get(),
            amplitude_lfo: self.amplitude_lfo.get(),
            ..NoteOscillatorConfig::default()
        };
        config.base.enabled = self.enabled.load(Ordering::Relaxed);
        config.base.waveform = self.waveform();
        config
    }
}

/// The global LFO's editable parameters.
#[derive(Debug)]
pub struct LfoParams {
    waveform: AtomicU8,
    pub width: AtomicF32,
    /// Rate in log2 Hz so the UI can step in cents.
    pub frequency_base: AtomicF32,
}

impl LfoParams {
    fn new() -> Self {
        Self {
            waveform: AtomicU8::new(Waveform::Sine.index()),
            width: AtomicF32::new(0.5),
            frequency_base: AtomicF32::new(0.0),
        }
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load(Ordering::Relaxed))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index(), Ordering::Relaxed);
    }

    pub fn load(&self) -> LfoOscillatorConfig {
        let mut config = LfoOscillatorConfig {
            frequency_base: self.frequency_base.get(),
            ..LfoOscillatorConfig::default()
        };
        config.base.waveform = self.waveform();
        config.base.width = self.width.get();
        config.refresh();
        config
    }
}

/// One ADSR's editable parameters.
#[derive(Debug)]
pub struct EnvParams {
    pub attack_rate: AtomicF32,
    pub decay_rate: AtomicF32,
    pub sustain_level: AtomicF32,
    pub release_rate: AtomicF32,
}

impl EnvParams {
    fn new(sustain_level: f32) -> Self {
        Self {
            attack_rate: AtomicF32::new(256.0),
            decay_rate: AtomicF32::new(16.0),
            sustain_level: AtomicF32::new(sustain_level),
            release_rate: AtomicF32::new(256.0),
        }
    }

    pub fn load(&self) -> EnvelopeConfig {
        EnvelopeConfig {
            attack_rate: self.attack_rate.get(),
            decay_rate: self.decay_rate.get(),
            sustain_level: self.sustain_level.get(),
            release_rate: self.release_rate.get(),
        }
    }
}

/// The ladder filter's editable parameters.
#[derive(Debug)]
pub struct FilterParams {
    mode: AtomicU8,
    pub cutoff_base: AtomicF32,
    pub cutoff_lfo: AtomicF32,
    pub cutoff_env: AtomicF32,
    pub resonance: AtomicF32,
}

impl FilterParams {
    fn new() -> Self {
        Self {
            mode: AtomicU8::new(FilterMode::None.index()),
            cutoff_base: AtomicF32::new(0.0),
            cutoff_lfo: AtomicF32::new(0.0),
            cutoff_env: AtomicF32::new(0.0),
            resonance: AtomicF32::new(0.0),
        }
    }

    pub fn mode(&self) -> FilterMode {
        FilterMode::from_index(self.mode.load(Ordering::Relaxed))
    }

    pub fn set_mode(&self, mode: FilterMode) {
        self.mode.store(mode.index(), Ordering::Relaxed);
    }

    pub fn load(&self) -> FilterConfig {
        FilterConfig {
            mode: self.mode(),
            cutoff_base: self.cutoff_base.get(),
            cutoff_lfo: self.cutoff_lfo.get(),
            cutoff_env: self.cutoff_env.get(),
            resonance: self.resonance.get(),
        }
    }
}

/// Everything shared between the control and audio contexts.
#[derive(Debug)]
pub struct SharedParams {
    /// The two note-oscillator slots; slot 1 starts disabled.
    pub osc: [OscSlotParams; 2],
    pub lfo: LfoParams,
    pub filter: FilterParams,
    pub filter_env: EnvParams,
    pub volume_env: EnvParams,
    /// Master gain applied before the output soft-clipper.
    pub output_scale: AtomicF32,
    /// PolyBLEP anti-aliasing switch.
    pub antialias: AtomicBool,
    /// Cooperative shutdown flag for the control loop.
    pub running: AtomicBool,

    octave: AtomicI32,
    keyboard_timescale: AtomicF32,
    gates: [AtomicBool; KEY_COUNT],

    // display snapshot, audio -> UI
    lfo_value: AtomicF32,
    voice_stages: [AtomicU8; KEY_COUNT],
    most_recent_key: AtomicUsize,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self {
            osc: [OscSlotParams::new(true), OscSlotParams::new(false)],
            lfo: LfoParams::new(),
            filter: FilterParams::new(),
            // filter envelope rests at zero, volume envelope holds full level
            filter_env: EnvParams::new(0.0),
            volume_env: EnvParams::new(1.0),
            output_scale: AtomicF32::new(1.0),
            antialias: AtomicBool::new(true),
            running: AtomicBool::new(true),
            octave: AtomicI32::new(OCTAVE_DEFAULT),
            keyboard_timescale: AtomicF32::new(1.0),
            gates: core::array::from_fn(|_| AtomicBool::new(false)),
            lfo_value: AtomicF32::new(0.0),
            voice_stages: core::array::from_fn(|_| AtomicU8::new(EnvelopeStage::Off.index())),
            most_recent_key: AtomicUsize::new(0),
        }
    }
}

impl SharedParams {
    /// Set a key's gate level. Safe from any thread; the audio context
    /// picks the level up at its next render block.
    pub fn set_gate(&self, key: usize, down: bool) {
        if key < KEY_COUNT {
            self.gates[key].store(down, Ordering::Relaxed);
        }
    }

    /// Current gate level for a key.
    pub fn gate(&self, key: usize) -> bool {
        key < KEY_COUNT && self.gates[key].load(Ordering::Relaxed)
    }

    /// Release every key.
    pub fn clear_gates(&self) {
        for gate in &self.gates {
            gate.store(false, Ordering::Relaxed);
        }
    }

    /// Current octave setting.
    pub fn octave(&self) -> i32 {
        self.octave.load(Ordering::Relaxed)
    }

    /// Shift the octave by `sign`, clamped, and rescale the keyboard.
    pub fn shift_octave(&self, sign: i32) -> i32 {
        let octave = (self.octave() + sign.signum()).clamp(OCTAVE_MIN, OCTAVE_MAX);
        self.octave.store(octave, Ordering::Relaxed);
        self.keyboard_timescale.set(octave_timescale(octave));
        octave
    }

    /// Frequency multiplier for the current octave.
    pub fn timescale(&self) -> f32 {
        self.keyboard_timescale.get()
    }

    /// Nudge the master gain by sixteenths, clamped to [0, 4].
    pub fn nudge_output_scale(&self, sign: i32) -> f32 {
        let scale = (self.output_scale.get() + sign.signum() as f32 / 16.0).clamp(0.0, 4.0);
        self.output_scale.set(scale);
        scale
    }

    /// Flip the anti-aliasing switch and return the new value.
    pub fn toggle_antialias(&self) -> bool {
        // no contention: only the control context writes this flag
        let enabled = !self.antialias.load(Ordering::Relaxed);
        self.antialias.store(enabled, Ordering::Relaxed);
        enabled
    }

    /// Latest LFO value published by the audio context.
    pub fn lfo_value(&self) -> f32 {
        self.lfo_value.get()
    }

    /// Envelope stage of a voice as of the last render block.
    pub fn voice_stage(&self, key: usize) -> EnvelopeStage {
        if key < KEY_COUNT {
            EnvelopeStage::from_index(self.voice_stages[key].load(Ordering::Relaxed))
        } else {
            EnvelopeStage::Off
        }
    }

    /// Key index of the most recently started voice.
    pub fn most_recent_key(&self) -> usize {
        self.most_recent_key.load(Ordering::Relaxed)
    }

    pub(crate) fn publish_lfo(&self, value: f32) {
        self.lfo_value.set(value);
    }

    pub(crate) fn publish_voice_stage(&self, key: usize, stage: EnvelopeStage) {
        self.voice_stages[key].store(stage.index(), Ordering::Relaxed);
    }

    pub(crate) fn publish_most_recent_key(&self, key: usize) {
        self.most_recent_key.store(key, Ordering::Relaxed);
    }
}
