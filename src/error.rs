//! Error types for the Lucky gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Lucky gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A single completion backend failed
    #[error("{backend} provider error: {cause}")]
    Provider {
        /// Backend that produced the failure
        backend: &'static str,
        /// Human-readable cause
        cause: String,
    },

    /// Every completion backend in the chain failed
    #[error("all completion providers failed to respond")]
    AllProvidersExhausted,

    /// No user message exists to regenerate a reply for
    #[error("no previous user message to regenerate a response for")]
    NothingToRegenerate,

    /// Microphone access was refused by the host
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No capture device, or the audio backend failed terminally
    #[error("audio capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// The local recognizer capability is missing on this host
    #[error("local speech recognition unsupported: {0}")]
    RecognitionUnsupported(String),

    /// One recognition backend failed
    #[error("{backend} recognition failed: {cause}")]
    RecognitionFailed {
        /// Backend that produced the failure
        backend: &'static str,
        /// Human-readable cause
        cause: String,
    },

    /// Every transcription strategy failed
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Audio processing error
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
