//! Patch options shared by the play and render commands.

use std::sync::atomic::Ordering;

use klang_synth::{FilterMode, SharedParams, Waveform};

/// Initial patch state, applied to the shared store before the engine
/// starts. Everything here can still be changed live while playing.
#[derive(Debug, clap::Args)]
pub struct PatchArgs {
    /// Oscillator waveform: sine, pulse, saw, triangle, noise, poly4,
    /// poly5, poly17, pulsepoly5, poly4poly5, poly17poly5
    #[arg(long, default_value = "sine")]
    pub waveform: Waveform,

    /// Pulse width / wave parameter, 0 to 1
    #[arg(long, default_value_t = 0.5)]
    pub width: f32,

    /// Enable the second oscillator slot
    #[arg(long)]
    pub osc2: bool,

    /// Second oscillator pitch offset in octaves (with --osc2)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub detune: f32,

    /// Filter mode: none, peak, lp1..lp4, hp1..hp4, bp1, bp1lp1, bp1lp2,
    /// bp1hp1, bp1hp2, bp2, notch, notchlp1, notchlp2, phase, phaselp1
    #[arg(long, default_value = "none")]
    pub filter: FilterMode,

    /// Filter cutoff in octaves above the key frequency
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub cutoff: f32,

    /// Filter resonance, 0 to 4
    #[arg(long, default_value_t = 0.0)]
    pub resonance: f32,

    /// Filter envelope depth on the cutoff, in octaves
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub cutoff_env: f32,

    /// Volume envelope attack rate (1/s)
    #[arg(long, default_value_t = 256.0)]
    pub attack: f32,

    /// Volume envelope decay rate (1/s)
    #[arg(long, default_value_t = 16.0)]
    pub decay: f32,

    /// Volume envelope sustain level, 0 to 1
    #[arg(long, default_value_t = 1.0)]
    pub sustain: f32,

    /// Volume envelope release rate (1/s)
    #[arg(long, default_value_t = 256.0)]
    pub release: f32,

    /// LFO rate in Hz
    #[arg(long, default_value_t = 1.0)]
    pub lfo_rate: f32,

    /// Vibrato depth in cents (LFO to pitch)
    #[arg(long, default_value_t = 0.0)]
    pub vibrato: f32,

    /// Output scale before the soft clipper
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Disable PolyBLEP anti-aliasing
    #[arg(long)]
    pub no_antialias: bool,
}

impl PatchArgs {
    /// Write the patch into the shared parameter store.
    pub fn apply(&self, params: &SharedParams) {
        params.osc[0].set_waveform(self.waveform);
        params.osc[0].width_base.set(self.width.clamp(0.0, 1.0));
        params.osc[0].frequency_lfo.set(self.vibrato / 1200.0);

        if self.osc2 {
            params.osc[1].enabled.store(true, Ordering::Relaxed);
            params.osc[1].set_waveform(self.waveform);
            params.osc[1].width_base.set(self.width.clamp(0.0, 1.0));
            params.osc[1].frequency_base.set(self.detune);
            params.osc[1].frequency_lfo.set(self.vibrato / 1200.0);
        }

        params.filter.set_mode(self.filter);
        params.filter.cutoff_base.set(self.cutoff);
        params.filter.cutoff_env.set(self.cutoff_env);
        params.filter.resonance.set(self.resonance.clamp(0.0, 4.0));

        params.volume_env.attack_rate.set(self.attack);
        params.volume_env.decay_rate.set(self.decay);
        params
            .volume_env
            .sustain_level
            .set(self.sustain.clamp(0.0, 1.0));
        params.volume_env.release_rate.set(self.release);

        params.lfo.frequency_base.set(self.lfo_rate.max(0.001).log2());

        params.output_scale.set(self.scale.clamp(0.0, 4.0));
        params
            .antialias
            .store(!self.no_antialias, Ordering::Relaxed);
    }
}
