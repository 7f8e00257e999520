//! Recording lifecycle state machine
//!
//! Owns at most one capture session at a time: device acquisition, silence
//! monitoring, unconditional teardown, and hand-off to the transcription
//! pipeline.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::stt::TranscriptionPipeline;
use crate::voice::capture::{AudioClip, CaptureSource};
use crate::voice::silence::{SilenceDetector, mean_magnitude};
use crate::{Error, Result};

/// Recording lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// No session live
    Idle,
    /// Capture device acquired, samples buffering
    Recording,
    /// Capture released, transcription underway
    Processing,
    /// A terminal failure ended the last session
    Error,
}

/// Why a recording stopped
///
/// Downstream handling is identical for both causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The user stopped the recording
    Manual,
    /// The quiet interval elapsed
    Silence,
}

/// Tuning for the recorder and its silence monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Mean-magnitude threshold above which a window counts as voice
    pub silence_threshold: f32,
    /// Quiet interval before auto-stop, in milliseconds
    pub auto_stop_delay_ms: u64,
    /// Monitor tick cadence, in milliseconds
    pub monitor_tick_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            silence_threshold: 0.02,
            auto_stop_delay_ms: 1500,
            monitor_tick_ms: 30,
        }
    }
}

impl RecorderConfig {
    /// Quiet interval before auto-stop
    #[must_use]
    pub const fn auto_stop_delay(&self) -> Duration {
        Duration::from_millis(self.auto_stop_delay_ms)
    }

    /// Monitor tick cadence
    #[must_use]
    pub const fn monitor_tick(&self) -> Duration {
        Duration::from_millis(self.monitor_tick_ms)
    }
}

/// Microphone recording controller
///
/// State machine `Idle → Recording → Processing → Idle`, with `Error`
/// reachable from any terminally failing transition. The capture source is
/// exclusively owned by the live session and is released exactly once, on
/// every exit path, before the state change becomes observable.
pub struct Recorder {
    source: Box<dyn CaptureSource>,
    config: RecorderConfig,
    state: RecorderState,
    detector: Option<SilenceDetector>,
}

impl Recorder {
    /// Create an idle recorder over a capture source
    #[must_use]
    pub fn new(source: Box<dyn CaptureSource>, config: RecorderConfig) -> Self {
        Self {
            source,
            config,
            state: RecorderState::Idle,
            detector: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> RecorderState {
        self.state
    }

    /// Acquire the capture device and begin buffering
    ///
    /// Starting while already recording is a no-op: a second concurrent
    /// session is never spawned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] or [`Error::CaptureUnavailable`]
    /// from the capture source (the recorder moves to `Error`), and
    /// [`Error::CaptureUnavailable`] when the previous session is still
    /// processing.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            RecorderState::Recording => return Ok(()),
            RecorderState::Processing => {
                return Err(Error::CaptureUnavailable(
                    "previous recording is still being processed".to_string(),
                ));
            }
            RecorderState::Idle | RecorderState::Error => {}
        }

        if let Err(e) = self.source.acquire() {
            self.state = RecorderState::Error;
            return Err(e);
        }

        self.detector = Some(SilenceDetector::new(
            self.config.silence_threshold,
            self.config.auto_stop_delay(),
            Instant::now(),
        ));
        self.state = RecorderState::Recording;
        tracing::debug!("recording started");
        Ok(())
    }

    /// Watch the capture stream until silence elapses or `stop_rx` flips
    ///
    /// Each tick measures the energy of the samples buffered since the last
    /// tick and feeds it to the silence detector. The loop schedules no
    /// further ticks once it returns, so a manual stop implicitly cancels
    /// any pending auto-stop.
    pub async fn monitor(&mut self, stop_rx: &mut watch::Receiver<bool>) -> StopCause {
        let mut tick = tokio::time::interval(self.config.monitor_tick());
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            if self.state != RecorderState::Recording {
                return StopCause::Manual;
            }

            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        return StopCause::Manual;
                    }
                }
                _ = tick.tick() => {
                    let window = self.source.window();
                    let energy = mean_magnitude(&window);
                    let fired = self
                        .detector
                        .as_mut()
                        .is_some_and(|d| d.observe(energy, Instant::now()));

                    if fired {
                        tracing::debug!("quiet interval elapsed, auto-stopping");
                        return StopCause::Silence;
                    }
                }
            }
        }
    }

    /// Stop the capture and flush the session buffer
    ///
    /// The capture device is released unconditionally, before the
    /// `Processing` state becomes observable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] when no recording is live
    pub fn stop(&mut self) -> Result<AudioClip> {
        if self.state != RecorderState::Recording {
            return Err(Error::Audio("stop called while not recording".to_string()));
        }

        self.source.release();
        self.detector = None;

        let clip = AudioClip {
            samples: self.source.take_all(),
            sample_rate: self.source.sample_rate(),
        };
        self.state = RecorderState::Processing;

        tracing::debug!(
            samples = clip.samples.len(),
            duration_secs = clip.duration_secs(),
            "recording stopped"
        );
        Ok(clip)
    }

    /// Stop the capture and hand the recording to the transcription pipeline
    ///
    /// Ends in `Idle` on success and `Error` on failure; the capture device
    /// is released in both cases before transcription begins.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Audio`] from [`Self::stop`] and the pipeline's
    /// [`Error::TranscriptionFailed`]
    pub async fn stop_and_transcribe(
        &mut self,
        pipeline: &TranscriptionPipeline,
    ) -> Result<String> {
        let clip = self.stop()?;

        let wav = match clip.to_wav() {
            Ok(wav) => wav,
            Err(e) => {
                self.state = RecorderState::Error;
                return Err(e);
            }
        };

        match pipeline.run(&wav).await {
            Ok(text) => {
                self.state = RecorderState::Idle;
                Ok(text)
            }
            Err(e) => {
                self.state = RecorderState::Error;
                Err(e)
            }
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        // Teardown on drop covers a session abandoned mid-recording
        if self.state == RecorderState::Recording {
            self.source.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::stt::Transcriber;

    /// Capture source scripted with a fixed sequence of windows
    struct ScriptedSource {
        windows: Arc<Mutex<Vec<Vec<f32>>>>,
        acquires: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
        deny: Option<fn() -> Error>,
    }

    struct SourceProbe {
        acquires: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(windows: Vec<Vec<f32>>) -> (Self, SourceProbe) {
            let acquires = Arc::new(AtomicUsize::new(0));
            let releases = Arc::new(AtomicUsize::new(0));
            let source = Self {
                windows: Arc::new(Mutex::new(windows)),
                acquires: Arc::clone(&acquires),
                releases: Arc::clone(&releases),
                deny: None,
            };
            (source, SourceProbe { acquires, releases })
        }

        fn denying(deny: fn() -> Error) -> (Self, SourceProbe) {
            let (mut source, probe) = Self::new(Vec::new());
            source.deny = Some(deny);
            (source, probe)
        }
    }

    impl CaptureSource for ScriptedSource {
        fn acquire(&mut self) -> Result<()> {
            if let Some(deny) = self.deny {
                return Err(deny());
            }
            self.acquires.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn window(&mut self) -> Vec<f32> {
            let mut windows = self.windows.lock().expect("windows lock");
            if windows.is_empty() {
                Vec::new()
            } else {
                windows.remove(0)
            }
        }

        fn take_all(&mut self) -> Vec<f32> {
            vec![0.1, -0.1, 0.2]
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }

        fn sample_rate(&self) -> u32 {
            16_000
        }
    }

    struct StubTranscriber {
        transcript: Option<&'static str>,
    }

    #[async_trait]
    impl Transcriber for StubTranscriber {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn transcribe(&self, _wav: &[u8]) -> Result<String> {
            self.transcript
                .map(ToString::to_string)
                .ok_or(Error::RecognitionFailed {
                    backend: "stub",
                    cause: "scripted failure".to_string(),
                })
        }
    }

    fn quick_config() -> RecorderConfig {
        RecorderConfig {
            silence_threshold: 0.02,
            auto_stop_delay_ms: 40,
            monitor_tick_ms: 5,
        }
    }

    #[test]
    fn start_while_recording_is_a_noop() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());

        recorder.start().expect("first start");
        recorder.start().expect("second start is a no-op");

        assert_eq!(recorder.state(), RecorderState::Recording);
        assert_eq!(probe.acquires.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn permission_refusal_moves_to_error() {
        let (source, probe) = ScriptedSource::denying(|| {
            Error::PermissionDenied("microphone access denied".to_string())
        });
        let mut recorder = Recorder::new(Box::new(source), quick_config());

        let result = recorder.start();

        assert!(matches!(result, Err(Error::PermissionDenied(_))));
        assert_eq!(recorder.state(), RecorderState::Error);
        assert_eq!(probe.acquires.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_without_a_live_session_fails() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());

        assert!(matches!(recorder.stop(), Err(Error::Audio(_))));
        assert_eq!(probe.releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sustained_silence_auto_stops() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        recorder.start().expect("start");
        let cause = recorder.monitor(&mut stop_rx).await;

        assert_eq!(cause, StopCause::Silence);

        recorder.stop().expect("stop after auto-stop");
        assert_eq!(recorder.state(), RecorderState::Processing);
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn frequent_voice_spikes_hold_off_auto_stop() {
        // every window is loud, so the detector can never fire
        let loud = vec![vec![0.5_f32; 64]; 1024];
        let (source, _probe) = ScriptedSource::new(loud);
        let mut recorder = Recorder::new(Box::new(source), quick_config());
        let (stop_tx, mut stop_rx) = watch::channel(false);

        recorder.start().expect("start");

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            stop_tx.send(true).ok();
        });

        let cause = recorder.monitor(&mut stop_rx).await;
        stopper.await.expect("stopper task");

        assert_eq!(cause, StopCause::Manual);
    }

    #[test]
    fn release_happens_exactly_once_per_session() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());

        recorder.start().expect("start");
        recorder.stop().expect("stop");
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);

        // dropping after a clean stop must not release again
        drop(recorder);
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_a_live_recorder_releases_the_device() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());

        recorder.start().expect("start");
        drop(recorder);

        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transcription_success_returns_to_idle() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());
        let pipeline = TranscriptionPipeline::new().with(Box::new(StubTranscriber {
            transcript: Some("hello from voice"),
        }));

        recorder.start().expect("start");
        let text = recorder
            .stop_and_transcribe(&pipeline)
            .await
            .expect("transcribes");

        assert_eq!(text, "hello from voice");
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transcription_failure_ends_in_error_state() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());
        let pipeline =
            TranscriptionPipeline::new().with(Box::new(StubTranscriber { transcript: None }));

        recorder.start().expect("start");
        let result = recorder.stop_and_transcribe(&pipeline).await;

        assert!(matches!(result, Err(Error::TranscriptionFailed(_))));
        assert_eq!(recorder.state(), RecorderState::Error);
        // the device was still released exactly once
        assert_eq!(probe.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn restart_after_error_is_allowed() {
        let (source, probe) = ScriptedSource::new(Vec::new());
        let mut recorder = Recorder::new(Box::new(source), quick_config());
        let pipeline =
            TranscriptionPipeline::new().with(Box::new(StubTranscriber { transcript: None }));

        recorder.start().expect("start");
        recorder.stop_and_transcribe(&pipeline).await.ok();
        assert_eq!(recorder.state(), RecorderState::Error);

        recorder.start().expect("restart after error");
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert_eq!(probe.acquires.load(Ordering::SeqCst), 2);
    }
}
