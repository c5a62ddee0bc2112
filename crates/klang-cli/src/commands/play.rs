//! Live play: map the computer keyboard onto the 24-key instrument.
//!
//! Two QWERTY rows cover two octaves (Z..M with sharps on the home row,
//! Q..U with sharps on the number row). Terminals that support the
//! keyboard enhancement protocol get true press/release gating; on plain
//! terminals, where key releases are invisible, a press toggles the gate
//! instead.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use klang_io::{OutputConfig, OutputStream, output_sample_rate};
use klang_synth::{Engine, KEY_COUNT, SharedParams};

use crate::patch::PatchArgs;

/// Physical key for each voice index, low note to high.
const KEY_MAP: [char; KEY_COUNT] = [
    'z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm', //
    'q', '2', 'w', '3', 'e', 'r', '5', 't', '6', 'y', '7', 'u',
];

#[derive(Debug, clap::Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub patch: PatchArgs,

    /// Output device name substring (default device when omitted)
    #[arg(long)]
    pub device: Option<String>,

    /// Stream buffer size in frames
    #[arg(long)]
    pub buffer_size: Option<u32>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let params = Arc::new(SharedParams::default());
    args.patch.apply(&params);

    let sample_rate = output_sample_rate(args.device.as_deref())?;
    let engine = Engine::new(sample_rate as f32, Arc::clone(&params));
    let config = OutputConfig {
        device: args.device.clone(),
        buffer_size: args.buffer_size,
    };
    let stream = OutputStream::open(&config, engine)?;

    println!("klang playing at {} Hz", stream.sample_rate());
    println!("  keys  Z S X D C V G B H N J M  /  Q 2 W 3 E R 5 T 6 Y 7 U");
    println!("  [ ]   octave     - +  output scale     F12  anti-alias     Esc  quit");

    key_loop(&params)?;

    params.running.store(false, Ordering::Relaxed);
    params.clear_gates();
    drop(stream);
    Ok(())
}

fn key_index(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    KEY_MAP.iter().position(|&k| k == c)
}

fn key_loop(params: &SharedParams) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        status("no key-release events from this terminal; keys toggle")?;
    }

    let result = key_loop_inner(params, enhanced);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn key_loop_inner(params: &SharedParams, enhanced: bool) -> anyhow::Result<()> {
    loop {
        if !event::poll(Duration::from_millis(25))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        // note keys care about press and release; everything else only
        // about presses
        if let KeyCode::Char(c) = key.code {
            if let Some(k) = key_index(c) {
                match key.kind {
                    KeyEventKind::Press if enhanced => params.set_gate(k, true),
                    KeyEventKind::Release => params.set_gate(k, false),
                    KeyEventKind::Press => params.set_gate(k, !params.gate(k)),
                    KeyEventKind::Repeat => {}
                }
                continue;
            }
        }

        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::Char('[') => {
                let octave = params.shift_octave(-1);
                status(&format!("octave {octave}"))?;
            }
            KeyCode::Char(']') => {
                let octave = params.shift_octave(1);
                status(&format!("octave {octave}"))?;
            }
            KeyCode::Char('-') => {
                let scale = params.nudge_output_scale(-1);
                status(&format!("output {:.0}%", scale * 100.0))?;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let scale = params.nudge_output_scale(1);
                status(&format!("output {:.0}%", scale * 100.0))?;
            }
            KeyCode::F(12) => {
                let enabled = params.toggle_antialias();
                status(if enabled { "anti-alias on" } else { "anti-alias off" })?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// One-line status update; raw mode needs the explicit carriage return.
fn status(message: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\r\x1b[2K  {message}")?;
    stdout.flush()?;
    Ok(())
}
