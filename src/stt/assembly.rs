//! `AssemblyAI` remote transcription (fallback backend)
//!
//! Three-call protocol: upload base64-encoded audio to receive an upload
//! URL, submit that URL for transcription to receive a job id, then poll
//! the job on a fixed interval until it reaches a terminal status.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::stt::{RemoteSttConfig, Transcriber};
use crate::{Error, Result};

const BACKEND: &str = "assemblyai";

/// Lifecycle of a remote transcription job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    Queued,
    /// A worker is transcribing the audio
    Processing,
    /// Finished successfully; the transcript is available
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl JobStatus {
    /// Terminal statuses end the polling loop
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Remote transcription job state, polled until terminal then discarded
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionJob {
    /// Job identifier assigned on submission
    pub id: String,
    /// Current lifecycle status
    pub status: JobStatus,
    /// Transcript, present once completed
    #[serde(default)]
    pub text: Option<String>,
    /// Failure detail, present once failed
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote polling transcription client
pub struct AssemblyAiTranscriber {
    client: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
}

impl AssemblyAiTranscriber {
    /// Create a new remote transcription client
    #[must_use]
    pub fn new(api_key: String, config: &RemoteSttConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key,
            poll_interval: config.poll_interval(),
            max_poll_attempts: config.max_poll_attempts,
        }
    }

    /// Upload audio, returning the URL the service stored it under
    async fn upload(&self, wav: &[u8]) -> Result<String> {
        let audio_data = base64::engine::general_purpose::STANDARD.encode(wav);

        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header("Authorization", &self.api_key)
            .json(&UploadRequest { audio_data })
            .send()
            .await
            .map_err(|e| remote_failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_failure(format!("upload rejected with {status}")));
        }

        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| remote_failure(format!("malformed upload response: {e}")))?;

        Ok(result.upload_url)
    }

    /// Submit the uploaded audio for transcription, returning the job id
    async fn submit(&self, audio_url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header("Authorization", &self.api_key)
            .json(&SubmitRequest {
                audio_url: audio_url.to_string(),
            })
            .send()
            .await
            .map_err(|e| remote_failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_failure(format!("submission rejected with {status}")));
        }

        let result: SubmitResponse = response
            .json()
            .await
            .map_err(|e| remote_failure(format!("malformed submission response: {e}")))?;

        Ok(result.id)
    }

    /// Fetch the current job state
    async fn fetch_job(&self, job_id: &str) -> Result<TranscriptionJob> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{job_id}", self.base_url))
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| remote_failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_failure(format!("status poll rejected with {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| remote_failure(format!("malformed job response: {e}")))
    }

    /// Poll the job on a fixed interval until it reaches a terminal status
    ///
    /// Unbounded by default; `max_poll_attempts` caps the loop when set.
    async fn await_terminal(&self, job_id: &str) -> Result<TranscriptionJob> {
        let mut attempts: u32 = 0;

        loop {
            tokio::time::sleep(self.poll_interval).await;

            let job = self.fetch_job(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }

            attempts += 1;
            if let Some(limit) = self.max_poll_attempts
                && attempts >= limit
            {
                return Err(remote_failure(format!(
                    "job {job_id} still {:?} after {limit} polls",
                    job.status
                )));
            }

            tracing::trace!(job = job_id, status = ?job.status, "transcription in progress");
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = wav.len(), "starting remote transcription");

        let upload_url = self.upload(wav).await?;
        let job_id = self.submit(&upload_url).await?;
        tracing::debug!(job = %job_id, "transcription job submitted");

        let job = self.await_terminal(&job_id).await?;
        match job.status {
            JobStatus::Completed => Ok(job.text.unwrap_or_default()),
            status => Err(remote_failure(
                job.error
                    .unwrap_or_else(|| format!("job ended with status {status:?}")),
            )),
        }
    }
}

const fn remote_failure(cause: String) -> Error {
    Error::RecognitionFailed {
        backend: BACKEND,
        cause,
    }
}

#[derive(Serialize)]
struct UploadRequest {
    audio_data: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct SubmitRequest {
    audio_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_deserialize_from_wire_names() {
        let parse = |s: &str| serde_json::from_str::<JobStatus>(s).expect("parses");

        assert_eq!(parse(r#""queued""#), JobStatus::Queued);
        assert_eq!(parse(r#""processing""#), JobStatus::Processing);
        assert_eq!(parse(r#""completed""#), JobStatus::Completed);
        assert_eq!(parse(r#""failed""#), JobStatus::Failed);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn job_parses_with_and_without_transcript() {
        let done: TranscriptionJob = serde_json::from_str(
            r#"{"id": "j1", "status": "completed", "text": "hello", "error": null}"#,
        )
        .expect("parses");
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.text.as_deref(), Some("hello"));

        let pending: TranscriptionJob =
            serde_json::from_str(r#"{"id": "j2", "status": "processing", "text": null, "error": null}"#)
                .expect("parses");
        assert_eq!(pending.status, JobStatus::Processing);
        assert!(pending.text.is_none());
    }
}
