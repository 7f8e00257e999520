//! Silence detection for auto-stopping a recording

use std::time::{Duration, Instant};

/// Default quiet interval before auto-stop fires
pub const DEFAULT_AUTO_STOP_DELAY: Duration = Duration::from_millis(1500);

/// Default mean-magnitude threshold above which a window counts as voice
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.02;

/// Decides when a recording has gone quiet for long enough to auto-stop
///
/// Each observed window above the threshold re-arms the quiet timer; once
/// the timer elapses without re-arming, the detector fires exactly once.
/// The detector itself is pure; the recorder's monitor loop drives it and
/// stops scheduling observations the instant recording ends.
#[derive(Debug)]
pub struct SilenceDetector {
    threshold: f32,
    delay: Duration,
    deadline: Instant,
    fired: bool,
}

impl SilenceDetector {
    /// Arm a detector at `now`
    #[must_use]
    pub fn new(threshold: f32, delay: Duration, now: Instant) -> Self {
        Self {
            threshold,
            delay,
            deadline: now + delay,
            fired: false,
        }
    }

    /// Feed one window's energy measure
    ///
    /// Returns `true` exactly once, when the quiet interval has fully
    /// elapsed without any window exceeding the threshold.
    pub fn observe(&mut self, energy: f32, now: Instant) -> bool {
        if self.fired {
            return false;
        }

        if energy > self.threshold {
            self.deadline = now + self.delay;
            return false;
        }

        if now >= self.deadline {
            self.fired = true;
            return true;
        }

        false
    }

    /// Whether auto-stop has already fired
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Mean absolute magnitude of a sample window
///
/// An empty window (no samples since the last check) measures as silence.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_magnitude(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f32 = samples.iter().map(|s| s.abs()).sum();
    sum / samples.len() as f32
}
