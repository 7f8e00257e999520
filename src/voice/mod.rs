//! Voice capture and silence detection
//!
//! Capture runs through the [`CaptureSource`] seam so the recording state
//! machine is testable without audio hardware. Transcription of finished
//! recordings lives in `crate::stt`.

mod capture;
mod recorder;
mod silence;

pub use capture::{AudioClip, CaptureSource, MicSource, SAMPLE_RATE};
pub use recorder::{Recorder, RecorderConfig, RecorderState, StopCause};
pub use silence::{
    DEFAULT_AUTO_STOP_DELAY, DEFAULT_SILENCE_THRESHOLD, SilenceDetector, mean_magnitude,
};
