//! Lucky Gateway - voice and chat gateway for the Lucky AI assistant
//!
//! This library provides the resilient orchestration core behind Lucky:
//! - Completion failover across three fixed-order backends
//! - Conversation state for the active session
//! - Microphone capture with silence auto-stop
//! - Local-then-remote speech transcription
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │        Terminal REPL  │  Identity  │  Notifier      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Lucky Gateway                        │
//! │  Conversation │ Orchestrator │ Recorder │ STT       │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Backends                             │
//! │  Hugging Face │ OpenRouter │ Together │ AssemblyAI  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod providers;
pub mod stt;
pub mod surface;
pub mod voice;

pub use chat::{ChatOrchestrator, Conversation, Message, MessageId, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use providers::{ChatProvider, ProviderChain};
pub use stt::{Transcriber, TranscriptionPipeline};
pub use voice::{Recorder, RecorderState};
