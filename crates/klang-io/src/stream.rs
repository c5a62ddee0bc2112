//! Real-time audio output via cpal.
//!
//! The engine is moved into the stream callback and pulled for
//! interleaved stereo frames. Devices that prefer `f32` get the i16
//! render converted in place through a preallocated scratch buffer, so
//! the callback never allocates regardless of the host's buffer sizes.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat};

use klang_synth::Engine;

use crate::{Error, Result};

/// Applied when the device will not report its output rate.
pub const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Scratch frames for the f32 conversion path.
const SCRATCH_FRAMES: usize = 2048;

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    pub name: String,
    pub default_sample_rate: u32,
}

/// Output stream settings.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Case-insensitive substring of the device name; default device
    /// when absent.
    pub device: Option<String>,
    /// Requested buffer size in frames; device default when absent.
    pub buffer_size: Option<u32>,
}

/// List the available output devices.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();
    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    for device in outputs {
        if let Ok(name) = device.name() {
            let default_sample_rate = device
                .default_output_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(FALLBACK_SAMPLE_RATE);
            devices.push(AudioDevice {
                name,
                default_sample_rate,
            });
        }
    }
    Ok(devices)
}

/// Sample rate the selected output device will run at.
///
/// Falls back to 44100 Hz when the device will not say. Call this before
/// building the engine so its time step matches the stream.
pub fn output_sample_rate(device: Option<&str>) -> Result<u32> {
    let host = cpal::default_host();
    let device = find_output_device(&host, device)?;
    let rate = device
        .default_output_config()
        .map(|c| c.sample_rate().0)
        .unwrap_or(FALLBACK_SAMPLE_RATE);
    Ok(if rate == 0 { FALLBACK_SAMPLE_RATE } else { rate })
}

fn find_output_device(host: &cpal::Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;
            for device in devices {
                if let Ok(device_name) = device.name() {
                    if device_name.to_lowercase().contains(&search_lower) {
                        return Ok(device);
                    }
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no output device matching '{search}'"
            )))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

/// A running audio output stream.
///
/// The stream plays until the handle is dropped.
pub struct OutputStream {
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl OutputStream {
    /// Open the output device and start pulling audio from the engine.
    ///
    /// The engine's sample rate should match what
    /// [`output_sample_rate`] reported for the same device.
    pub fn open(config: &OutputConfig, mut engine: Engine) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_output_device(&host, config.device.as_deref())?;
        let supported = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        if (engine.sample_rate() - sample_rate as f32).abs() > 0.5 {
            tracing::warn!(
                engine = engine.sample_rate(),
                device = sample_rate,
                "engine sample rate does not match output device"
            );
        }

        let stream_config = cpal::StreamConfig {
            channels: 2,
            sample_rate: supported.sample_rate(),
            buffer_size: config
                .buffer_size
                .map(BufferSize::Fixed)
                .unwrap_or(BufferSize::Default),
        };

        let error_callback = |err: cpal::StreamError| {
            tracing::error!(error = %err, "audio stream error");
        };

        let stream = match supported.sample_format() {
            SampleFormat::I16 => device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        engine.render(data);
                    },
                    error_callback,
                    None,
                )
                .map_err(|e| Error::Stream(e.to_string()))?,
            SampleFormat::F32 => {
                let mut scratch = vec![0i16; SCRATCH_FRAMES * 2];
                device
                    .build_output_stream(
                        &stream_config,
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            for chunk in data.chunks_mut(scratch.len()) {
                                let part = &mut scratch[..chunk.len()];
                                engine.render(part);
                                for (out, &s) in chunk.iter_mut().zip(part.iter()) {
                                    *out = f32::from(s) / 32768.0;
                                }
                            }
                        },
                        error_callback,
                        None,
                    )
                    .map_err(|e| Error::Stream(e.to_string()))?
            }
            other => return Err(Error::UnsupportedFormat(format!("{other:?}"))),
        };

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            sample_rate,
            format = ?supported.sample_format(),
            "output stream started"
        );

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    /// Sample rate the stream runs at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
