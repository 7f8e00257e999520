//! Speech-to-text pipeline
//!
//! Converts a finished recording into text. A fast on-host recognizer is
//! tried first; the remote polling service only runs after the local
//! strategy has failed. Strategy order is a first-class value, not nested
//! control flow.

mod assembly;
mod config;
mod local;

pub use assembly::{AssemblyAiTranscriber, JobStatus, TranscriptionJob};
pub use config::{LocalSttConfig, RemoteSttConfig, SttConfig};
pub use local::LocalRecognizer;

use async_trait::async_trait;

use crate::{Error, Result};

/// Capability contract shared by transcription backends
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Backend name for logging and error attribution
    fn name(&self) -> &'static str;

    /// Transcribe a WAV-encoded recording
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecognitionUnsupported`] when the backend capability
    /// is missing on this host, [`Error::RecognitionFailed`] on any other
    /// backend failure
    async fn transcribe(&self, wav: &[u8]) -> Result<String>;
}

/// Ordered transcription strategies, first success wins
#[derive(Default)]
pub struct TranscriptionPipeline {
    strategies: Vec<Box<dyn Transcriber>>,
}

impl TranscriptionPipeline {
    /// Create an empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy to the end of the pipeline
    #[must_use]
    pub fn with(mut self, strategy: Box<dyn Transcriber>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Append a strategy to the end of the pipeline
    pub fn push(&mut self, strategy: Box<dyn Transcriber>) {
        self.strategies.push(strategy);
    }

    /// Number of strategies in the pipeline
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the pipeline holds no strategies
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the recording through each strategy in order
    ///
    /// Every strategy receives the same audio bytes. A strategy is only
    /// attempted once the previous one's failure is known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TranscriptionFailed`] carrying the root cause once
    /// every strategy has failed
    pub async fn run(&self, wav: &[u8]) -> Result<String> {
        let mut last_failure: Option<Error> = None;

        for strategy in &self.strategies {
            tracing::debug!(backend = strategy.name(), "attempting transcription");
            match strategy.transcribe(wav).await {
                Ok(text) => {
                    tracing::info!(backend = strategy.name(), "transcription complete");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(
                        backend = strategy.name(),
                        error = %e,
                        "transcription backend failed, trying next"
                    );
                    last_failure = Some(e);
                }
            }
        }

        Err(Error::TranscriptionFailed(last_failure.map_or_else(
            || "no transcription backend configured".to_string(),
            |e| e.to_string(),
        )))
    }
}
