//! On-host synchronous speech recognition
//!
//! Invokes a recognizer binary installed on the host (default
//! `whisper-cli`). The capability is optional: a missing binary reports
//! [`Error::RecognitionUnsupported`] so the pipeline falls back to the
//! remote backend. Recognition is single-shot in one fixed locale.

use std::io::Write as _;

use async_trait::async_trait;
use tokio::process::Command;

use crate::stt::{LocalSttConfig, Transcriber};
use crate::{Error, Result};

const BACKEND: &str = "local";

/// Single-shot recognizer backed by a host-installed binary
///
/// The binary receives `--language <locale>` and the WAV path, and is
/// expected to print the transcript on stdout.
pub struct LocalRecognizer {
    command: String,
    language: String,
}

impl LocalRecognizer {
    /// Create a new local recognizer
    #[must_use]
    pub fn new(config: &LocalSttConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl Transcriber for LocalRecognizer {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        let binary = which::which(&self.command).map_err(|_| {
            Error::RecognitionUnsupported(format!(
                "recognizer '{}' is not installed on this host",
                self.command
            ))
        })?;

        let file = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .and_then(|mut f| {
                f.write_all(wav)?;
                f.flush()?;
                Ok(f)
            })
            .map_err(|e| Error::RecognitionFailed {
                backend: BACKEND,
                cause: format!("failed to stage audio: {e}"),
            })?;

        tracing::debug!(
            binary = %binary.display(),
            audio_bytes = wav.len(),
            "starting local recognition"
        );

        let output = Command::new(&binary)
            .arg("--language")
            .arg(&self.language)
            .arg(file.path())
            .output()
            .await
            .map_err(|e| Error::RecognitionFailed {
                backend: BACKEND,
                cause: e.to_string(),
            })?;

        // The temp file must outlive the recognizer process
        drop(file);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RecognitionFailed {
                backend: BACKEND,
                cause: format!("recognizer exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(Error::RecognitionFailed {
                backend: BACKEND,
                cause: "recognizer produced no transcript".to_string(),
            });
        }

        tracing::info!(transcript = %transcript, "local recognition complete");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reports_unsupported() {
        let recognizer = LocalRecognizer::new(&LocalSttConfig {
            command: "definitely-not-a-recognizer-binary".to_string(),
            language: "en".to_string(),
        });

        let result = recognizer.transcribe(b"wav").await;

        assert!(matches!(result, Err(Error::RecognitionUnsupported(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn transcript_is_read_from_stdout() {
        // `echo` stands in for a recognizer: it prints its arguments
        let recognizer = LocalRecognizer::new(&LocalSttConfig {
            command: "echo".to_string(),
            language: "en".to_string(),
        });

        let transcript = recognizer.transcribe(b"wav").await.expect("echo succeeds");

        assert!(transcript.starts_with("--language en"));
    }
}
