//! Completion backend clients
//!
//! Three backends answer chat turns: `Hugging Face` (primary), `OpenRouter`
//! (secondary) and `Together` (tertiary). Their wire formats differ but all
//! implement the same [`ChatProvider`] contract, which is what lets the
//! orchestrator walk a fixed-order [`ProviderChain`] until one succeeds.

mod config;
mod huggingface;
mod openrouter;
mod together;

pub use config::{CompletionConfig, HuggingFaceConfig, OpenRouterConfig, TogetherConfig};
pub use huggingface::HuggingFaceProvider;
pub use openrouter::OpenRouterProvider;
pub use together::TogetherProvider;

use async_trait::async_trait;
use serde::Serialize;

use crate::chat::Message;
use crate::{Error, Result};

/// One conversation turn in the shape every backend accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireTurn {
    /// "user" or "assistant"
    pub role: &'static str,
    /// Turn text
    pub content: String,
}

/// Map stored history to wire turns, appending the new user text last
///
/// Order is preserved; every stored message keeps its author role.
#[must_use]
pub fn wire_history(history: &[Message], content: &str) -> Vec<WireTurn> {
    let mut turns: Vec<WireTurn> = history
        .iter()
        .map(|m| WireTurn {
            role: m.role.as_wire(),
            content: m.content.clone(),
        })
        .collect();

    turns.push(WireTurn {
        role: "user",
        content: content.to_string(),
    });

    turns
}

/// Capability contract shared by all completion backends
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Backend name for logging and error attribution
    fn name(&self) -> &'static str;

    /// Send the conversation plus one new user turn, returning the reply text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the backend rejects the request or
    /// returns a response missing the expected reply field
    async fn complete(&self, content: &str, history: &[Message]) -> Result<String>;
}

/// Fixed-order fallback chain over completion backends
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn ChatProvider>>,
}

impl ProviderChain {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend to the end of the chain
    #[must_use]
    pub fn with(mut self, provider: Box<dyn ChatProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Append a backend to the end of the chain
    pub fn push(&mut self, provider: Box<dyn ChatProvider>) {
        self.providers.push(provider);
    }

    /// Number of backends in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain holds no backends
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try each backend strictly in declared order until one succeeds
    ///
    /// Individual failures are logged and recovered by moving to the next
    /// backend; the second backend is never invoked before the first's
    /// failure is known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllProvidersExhausted`] once every backend has failed
    pub async fn complete(&self, content: &str, history: &[Message]) -> Result<String> {
        for provider in &self.providers {
            tracing::debug!(provider = provider.name(), "attempting completion");
            match provider.complete(content, history).await {
                Ok(text) => {
                    tracing::debug!(provider = provider.name(), "completion succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                }
            }
        }

        Err(Error::AllProvidersExhausted)
    }
}

/// Extract a human-readable message from a flat error body (`{"error": "…"}`)
///
/// Falls back to the raw status text when the field is absent or the body is
/// not valid JSON.
#[must_use]
pub(crate) fn error_from_flat_body(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(ToString::to_string))
        .unwrap_or_else(|| status.to_string())
}

/// Extract a human-readable message from a nested error body
/// (`{"error": {"message": "…"}}`), falling back to the raw status text
#[must_use]
pub(crate) fn error_from_nested_body(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(ToString::to_string))
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Conversation, Role};

    #[test]
    fn wire_history_preserves_order_and_roles() {
        let mut conversation = Conversation::new();
        conversation.push_assistant("hello there");
        conversation.push_user("hi");
        conversation.push_assistant("how can I help?");

        let turns = wire_history(conversation.messages(), "what's new?");

        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, "assistant");
        assert_eq!(turns[1].role, "user");
        assert_eq!(turns[2].role, "assistant");
        assert_eq!(turns[3].role, "user");
        assert_eq!(turns[3].content, "what's new?");
    }

    #[test]
    fn wire_history_on_empty_log_holds_only_the_new_turn() {
        let turns = wire_history(&[], "hi");

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[0].content, "hi");
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(Role::User.as_wire(), "user");
        assert_eq!(Role::Assistant.as_wire(), "assistant");
    }

    // -- error body extraction ------------------------------------------------

    #[test]
    fn flat_error_body_yields_the_error_string() {
        let body = r#"{"error": "model overloaded"}"#;
        let status = reqwest::StatusCode::SERVICE_UNAVAILABLE;
        assert_eq!(error_from_flat_body(body, status), "model overloaded");
    }

    #[test]
    fn flat_extraction_falls_back_to_status_text() {
        let status = reqwest::StatusCode::BAD_GATEWAY;
        assert_eq!(error_from_flat_body("not json", status), status.to_string());
        assert_eq!(error_from_flat_body("{}", status), status.to_string());
    }

    #[test]
    fn nested_error_body_yields_the_message_field() {
        let body = r#"{"error": {"message": "invalid api key", "code": 401}}"#;
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert_eq!(error_from_nested_body(body, status), "invalid api key");
    }

    #[test]
    fn nested_extraction_falls_back_to_status_text() {
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        assert_eq!(
            error_from_nested_body(r#"{"error": "flat"}"#, status),
            status.to_string()
        );
        assert_eq!(error_from_nested_body("", status), status.to_string());
    }
}
