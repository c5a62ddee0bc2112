//! Audio I/O for the klang synthesizer.
//!
//! This crate owns everything that touches the host system:
//!
//! - [`stream`] - cpal output stream that pulls PCM from the engine
//! - [`wav`] - 16-bit stereo WAV export for offline rendering
//!
//! The engine renders interleaved stereo `i16`; the stream layer adapts
//! that to whatever sample format the output device wants.

mod stream;
mod wav;

pub use stream::{
    AudioDevice, FALLBACK_SAMPLE_RATE, OutputConfig, OutputStream, list_output_devices,
    output_sample_rate,
};
pub use wav::write_wav;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("no audio output device available")]
    NoDevice,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
