//! Configuration for speech-to-text

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level speech-to-text configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Local recognizer configuration
    pub local: LocalSttConfig,
    /// Remote polling backend configuration
    pub remote: RemoteSttConfig,
}

/// On-host recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSttConfig {
    /// Recognizer binary looked up on `PATH`
    pub command: String,
    /// Recognition locale (single fixed language)
    pub language: String,
}

impl Default for LocalSttConfig {
    fn default() -> Self {
        Self {
            command: "whisper-cli".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Remote polling backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSttConfig {
    /// API base URL
    pub base_url: String,
    /// Delay between job status polls, in milliseconds
    pub poll_interval_ms: u64,
    /// Cap on status polls per job; `None` polls until a terminal status
    pub max_poll_attempts: Option<u32>,
}

impl Default for RemoteSttConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".to_string(),
            poll_interval_ms: 1000,
            max_poll_attempts: None,
        }
    }
}

impl RemoteSttConfig {
    /// Delay between job status polls
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
