//! Audio capture from the microphone

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for speech capture (16 kHz)
pub const SAMPLE_RATE: u32 = 16_000;

/// One finished recording, ready for transcription
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Mono samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    /// Samples per second
    pub sample_rate: u32,
}

impl AudioClip {
    /// Recording length in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode as 16-bit mono WAV for the transcription backends
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Audio(e.to_string()))?;

            for &sample in &self.samples {
                #[allow(clippy::cast_possible_truncation)]
                let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer
                    .write_sample(sample_i16)
                    .map_err(|e| Error::Audio(e.to_string()))?;
            }

            writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}

/// Microphone-like source owned by a single recording session
///
/// Abstracted behind a trait so the recorder state machine can be
/// exercised without audio hardware.
pub trait CaptureSource {
    /// Acquire the device and begin buffering samples
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] when access is refused,
    /// [`Error::CaptureUnavailable`] when no device or backend is usable
    fn acquire(&mut self) -> Result<()>;

    /// Samples buffered since the previous call (the monitor window)
    fn window(&mut self) -> Vec<f32>;

    /// All samples captured this session, flushing the buffer
    fn take_all(&mut self) -> Vec<f32>;

    /// Release the device; invoked exactly once per acquired session
    fn release(&mut self);

    /// Samples per second of the captured audio
    fn sample_rate(&self) -> u32;
}

/// cpal-backed capture from the default input device
pub struct MicSource {
    buffer: Arc<Mutex<Vec<f32>>>,
    cursor: usize,
    stream: Option<Stream>,
}

impl MicSource {
    /// Create an inert source; the device is acquired on [`CaptureSource::acquire`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            cursor: 0,
            stream: None,
        }
    }
}

impl Default for MicSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MicSource {
    fn acquire(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::CaptureUnavailable("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::CaptureUnavailable(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| {
                Error::CaptureUnavailable("no suitable capture config found".to_string())
            })?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "acquiring capture device"
        );

        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        self.cursor = 0;

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "capture stream error");
                },
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::DeviceNotAvailable => Error::PermissionDenied(
                    "input device refused the stream (in use or access denied)".to_string(),
                ),
                other => Error::CaptureUnavailable(other.to_string()),
            })?;

        stream
            .play()
            .map_err(|e| Error::CaptureUnavailable(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("capture started");
        Ok(())
    }

    fn window(&mut self) -> Vec<f32> {
        let Ok(buf) = self.buffer.lock() else {
            return Vec::new();
        };
        let window = buf[self.cursor.min(buf.len())..].to_vec();
        self.cursor = buf.len();
        window
    }

    fn take_all(&mut self) -> Vec<f32> {
        self.cursor = 0;
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("capture device released");
        }
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_encoding_produces_a_riff_header() {
        let clip = AudioClip {
            samples: vec![0.0, 0.5, -0.5, 1.0],
            sample_rate: SAMPLE_RATE,
        };

        let wav = clip.to_wav().expect("encodes");

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte header plus 2 bytes per sample
        assert_eq!(wav.len(), 44 + clip.samples.len() * 2);
    }

    #[test]
    fn duration_follows_sample_count() {
        let clip = AudioClip {
            samples: vec![0.0; SAMPLE_RATE as usize / 2],
            sample_rate: SAMPLE_RATE,
        };
        assert!((clip.duration_secs() - 0.5).abs() < 1e-6);

        let empty = AudioClip {
            samples: Vec::new(),
            sample_rate: 0,
        };
        assert!(empty.duration_secs().abs() < f32::EPSILON);
    }
}
