//! Offline rendering: hold a chord, release, write the result as WAV.

use std::path::PathBuf;
use std::sync::Arc;

use klang_io::write_wav;
use klang_synth::{Engine, KEY_COUNT, SharedParams};

use crate::patch::PatchArgs;

/// Frames per render call; gate changes land on these boundaries, as
/// they would on live audio-callback boundaries.
const BLOCK_FRAMES: usize = 512;

#[derive(Debug, clap::Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub patch: PatchArgs,

    /// Output WAV path
    #[arg(long, short, default_value = "klang.wav")]
    pub out: PathBuf,

    /// Keys to hold, 0 to 23 (0 is middle C, 9 is A4)
    #[arg(long, value_delimiter = ',', default_value = "0,4,7")]
    pub keys: Vec<usize>,

    /// Total length in seconds
    #[arg(long, default_value_t = 2.0)]
    pub duration: f32,

    /// Fraction of the duration to hold the keys before release
    #[arg(long, default_value_t = 0.75)]
    pub hold: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    pub sample_rate: u32,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    for &key in &args.keys {
        anyhow::ensure!(key < KEY_COUNT, "key {key} out of range 0..{KEY_COUNT}");
    }
    anyhow::ensure!(args.duration > 0.0, "duration must be positive");

    let params = Arc::new(SharedParams::default());
    args.patch.apply(&params);
    let mut engine = Engine::new(args.sample_rate as f32, Arc::clone(&params));

    let total_frames = (args.duration * args.sample_rate as f32) as usize;
    let held_frames = (total_frames as f32 * args.hold.clamp(0.0, 1.0)) as usize;
    let mut samples = vec![0i16; total_frames * 2];

    for &key in &args.keys {
        params.set_gate(key, true);
    }

    let mut frame = 0;
    while frame < total_frames {
        if frame >= held_frames {
            params.clear_gates();
        }
        let end = (frame + BLOCK_FRAMES).min(total_frames);
        engine.render(&mut samples[frame * 2..end * 2]);
        frame = end;
    }

    write_wav(&args.out, args.sample_rate, &samples)?;
    tracing::info!(path = %args.out.display(), frames = total_frames, "render finished");
    println!(
        "wrote {} ({:.2} s at {} Hz, keys {:?})",
        args.out.display(),
        args.duration,
        args.sample_rate,
        args.keys
    );
    Ok(())
}
