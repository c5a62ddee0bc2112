//! The audio-rate render loop.
//!
//! [`Engine`] owns everything the audio callback touches: the noise
//! tables, all 24 voices, the LFO state, and the precomputed keyboard
//! table. The control context only ever reaches it through the shared
//! parameter store, so the callback can run without locks.
//!
//! Per output sample the loop advances the LFO, re-derives the oscillator
//! configs from their bases, then for each live voice advances both
//! envelopes, sums the oscillator slots, runs the ladder filter with
//! key-followed cutoff, and accumulates the envelope-scaled result. The
//! voice sum is soft-clipped through `tanh`, scaled to 16 bits, and
//! written to both stereo channels.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use klang_dsp::{FilterMode, NoiseTables, OscillatorState, math};

use crate::keyboard::{KEY_COUNT, frequency_table};
use crate::shared::SharedParams;
use crate::voice::Voice;

/// The synthesizer engine.
///
/// Construct once the output sample rate is known, then call
/// [`render`](Self::render) from the audio callback. All buffers are
/// preallocated here; the render path never allocates.
pub struct Engine {
    params: Arc<SharedParams>,
    tables: NoiseTables,
    sample_rate: f32,
    dt: f32,
    key_frequency: [f32; KEY_COUNT],
    voices: [Voice; KEY_COUNT],
    lfo: OscillatorState,
    active: [usize; KEY_COUNT],
    active_len: usize,
}

impl Engine {
    /// Build an engine for the given output sample rate.
    pub fn new(sample_rate: f32, params: Arc<SharedParams>) -> Self {
        Self {
            params,
            tables: NoiseTables::new(),
            sample_rate,
            dt: 1.0 / sample_rate,
            key_frequency: frequency_table(),
            voices: [Voice::default(); KEY_COUNT],
            lfo: OscillatorState::new(),
            active: [0; KEY_COUNT],
            active_len: 0,
        }
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The shared parameter store this engine reads.
    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    /// Voice states, for display taps.
    pub fn voices(&self) -> &[Voice; KEY_COUNT] {
        &self.voices
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Render interleaved stereo 16-bit samples, filling the whole
    /// buffer. Returns the number of bytes written.
    pub fn render(&mut self, buffer: &mut [i16]) -> usize {
        let frames = buffer.len() / 2;
        let bytes = buffer.len() * core::mem::size_of::<i16>();

        self.apply_gates();
        self.rebuild_active();

        let antialias = self.params.antialias.load(core::sync::atomic::Ordering::Relaxed);

        if self.active_len == 0 {
            buffer.fill(0);
            // advance the LFO in one step so its phase stays continuous
            // across silent blocks
            let lfo_config = self.params.lfo.load();
            let lfo = self.lfo.update(
                &lfo_config.base,
                &self.tables,
                antialias,
                1.0,
                frames as f32 * self.dt,
            );
            self.params.publish_lfo(lfo);
            self.publish_stages();
            return bytes;
        }

        let mut last_lfo = 0.0;
        for frame in 0..frames {
            // reload the bases every sample; an edit from the control
            // context lands within one sample and tearing is harmless
            let lfo_config = self.params.lfo.load();
            let lfo = self
                .lfo
                .update(&lfo_config.base, &self.tables, antialias, 1.0, self.dt);
            last_lfo = lfo;

            let mut osc_configs = [self.params.osc[0].load(), self.params.osc[1].load()];
            for config in &mut osc_configs {
                config.modulate(lfo);
            }
            let filter_config = self.params.filter.load();
            let filter_env_config = self.params.filter_env.load();
            let volume_env_config = self.params.volume_env.load();
            let timescale = self.params.timescale();
            let output_scale = self.params.output_scale.get();

            let mut sample = 0.0f32;
            let mut i = 0;
            while i < self.active_len {
                let k = self.active[i];
                let key_freq = self.key_frequency[k] * timescale;
                let voice = &mut self.voices[k];

                let filter_env = voice.filter_env.advance(&filter_env_config, self.dt);
                let volume_env = voice.volume_env.advance(&volume_env_config, self.dt);
                if !voice.volume_env.is_active() {
                    // swap-remove the finished voice for the rest of the block
                    self.active_len -= 1;
                    self.active[i] = self.active[self.active_len];
                    continue;
                }

                let mut osc_value = 0.0;
                for (state, config) in voice.osc.iter_mut().zip(&osc_configs) {
                    if !config.base.enabled {
                        continue;
                    }
                    osc_value +=
                        state.update(&config.base, &self.tables, antialias, key_freq, self.dt);
                }

                let voice_value = if filter_config.mode != FilterMode::None {
                    let cutoff = key_freq
                        * math::octaves_to_ratio(
                            filter_config.cutoff_base
                                + filter_config.cutoff_lfo * lfo
                                + filter_config.cutoff_env * filter_env,
                        );
                    voice.filter.update(&filter_config, cutoff, osc_value, self.dt)
                } else {
                    osc_value
                };

                sample += voice_value * volume_env;
                i += 1;
            }

            let out = math::sample_to_i16(math::soft_clip(sample * output_scale));
            buffer[2 * frame] = out;
            buffer[2 * frame + 1] = out;
        }

        // an odd trailing sample (non-stereo caller) is zeroed, not stale
        if buffer.len() % 2 == 1 {
            buffer[frames * 2] = 0;
        }

        self.params.publish_lfo(last_lfo);
        self.publish_stages();
        bytes
    }

    /// Pick up gate levels from the shared store and apply edges.
    fn apply_gates(&mut self) {
        for k in 0..KEY_COUNT {
            let down = self.params.gate(k);
            if self.voices[k].set_gate(down) {
                self.params.publish_most_recent_key(k);
            }
        }
    }

    /// Rebuild the fixed-capacity active-voice index list.
    fn rebuild_active(&mut self) {
        self.active_len = 0;
        for (k, voice) in self.voices.iter().enumerate() {
            if voice.is_active() {
                self.active[self.active_len] = k;
                self.active_len += 1;
            }
        }
    }

    fn publish_stages(&self) {
        for (k, voice) in self.voices.iter().enumerate() {
            self.params.publish_voice_stage(k, voice.volume_env.stage);
        }
    }
}
