//! ADSR envelope generator.
//!
//! Each segment is an exponential approach toward a biased target: the
//! target sits past the segment's destination, so the curve keeps the
//! exponential shape but crosses its boundary in finite time instead of
//! converging asymptotically. Attack overshoots 1.0 by one time
//! constant's worth; decay and release undershoot their floors by three.
//!
//! Stage changes come from two places only: gate edges (key events,
//! applied by the voice owner) and the amplitude crossing a boundary
//! inside [`EnvelopeState::advance`].

/// Attack target bias: `1/(1 - e^-1) - 1`, one time constant.
pub const ATTACK_BIAS: f32 = 0.581_976_7;

/// Decay/release target bias: `1 - 1/(1 - e^-3)`, three time constants.
pub const DECAY_BIAS: f32 = -0.052_395_88;

/// Envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Inactive; amplitude is exactly zero.
    #[default]
    Off,
    /// Rising toward peak.
    Attack,
    /// Falling from peak toward the sustain level.
    Decay,
    /// Holding while the gate stays down.
    Sustain,
    /// Falling toward zero after gate release.
    Release,
}

impl EnvelopeStage {
    /// Stable index for display snapshots.
    pub fn index(self) -> u8 {
        match self {
            EnvelopeStage::Off => 0,
            EnvelopeStage::Attack => 1,
            EnvelopeStage::Decay => 2,
            EnvelopeStage::Sustain => 3,
            EnvelopeStage::Release => 4,
        }
    }

    /// Inverse of [`index`](Self::index); out-of-range values map to Off.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => EnvelopeStage::Attack,
            2 => EnvelopeStage::Decay,
            3 => EnvelopeStage::Sustain,
            4 => EnvelopeStage::Release,
            _ => EnvelopeStage::Off,
        }
    }
}

/// Envelope rates and sustain level.
///
/// Rates are exponential-approach coefficients in units of 1/seconds;
/// larger is faster. The UI steps them by doubling and halving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeConfig {
    pub attack_rate: f32,
    pub decay_rate: f32,
    /// Sustain level in [0, 1].
    pub sustain_level: f32,
    pub release_rate: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_rate: 256.0,
            decay_rate: 16.0,
            sustain_level: 1.0,
            release_rate: 256.0,
        }
    }
}

/// Per-voice envelope state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeState {
    /// Key-held flag; edges drive the stage transitions.
    pub gate: bool,
    pub stage: EnvelopeStage,
    /// Current output in [0, 1]. Zero exactly when the stage is Off.
    pub amplitude: f32,
}

impl EnvelopeState {
    /// Gate rising edge: enter attack from any stage.
    pub fn gate_on(&mut self) {
        self.gate = true;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate falling edge: enter release unless already off.
    pub fn gate_off(&mut self) {
        self.gate = false;
        if self.stage != EnvelopeStage::Off {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// True while the envelope produces output.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Off
    }

    /// Advance by `dt` seconds and return the amplitude.
    #[inline]
    pub fn advance(&mut self, config: &EnvelopeConfig, dt: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Off => {}

            EnvelopeStage::Attack => {
                let target = 1.0 + ATTACK_BIAS;
                self.amplitude += (target - self.amplitude) * config.attack_rate * dt;
                if self.amplitude >= 1.0 {
                    self.amplitude = 1.0;
                    // sustain at full level skips the decay segment entirely
                    self.stage = if config.sustain_level < 1.0 {
                        EnvelopeStage::Decay
                    } else {
                        EnvelopeStage::Sustain
                    };
                }
            }

            EnvelopeStage::Decay => {
                let target =
                    config.sustain_level + (1.0 - config.sustain_level) * DECAY_BIAS;
                self.amplitude += (target - self.amplitude) * config.decay_rate * dt;
                if self.amplitude <= config.sustain_level {
                    self.amplitude = config.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {}

            EnvelopeStage::Release => {
                // Above the sustain level the release continues at the decay
                // rate when that is the faster of the two, so a release cut
                // short of sustain does not suddenly slow down.
                let rate = if self.amplitude >= config.sustain_level
                    && config.decay_rate >= config.release_rate
                {
                    config.decay_rate
                } else {
                    config.release_rate
                };
                self.amplitude += (DECAY_BIAS - self.amplitude) * rate * dt;
                if self.amplitude <= 0.0 {
                    self.amplitude = 0.0;
                    self.stage = EnvelopeStage::Off;
                }
            }
        }

        self.amplitude
    }
}
