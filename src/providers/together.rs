//! `Together` chat completions client (tertiary backend)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::providers::{
    ChatProvider, CompletionConfig, WireTurn, error_from_nested_body, wire_history,
};
use crate::{Error, Result};

const BACKEND: &str = "together";

/// `Together` OpenAI-shaped completion client, last resort in the chain
pub struct TogetherProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl TogetherProvider {
    /// Create a new `Together` client
    #[must_use]
    pub fn new(api_key: String, config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.together.endpoint.clone(),
            api_key,
            model: config.together.model.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_request(&self, content: &str, history: &[Message]) -> ChatRequest {
        let mut messages = vec![WireTurn {
            role: "system",
            content: self.system_prompt.clone(),
        }];
        messages.extend(wire_history(history, content));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ChatProvider for TogetherProvider {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn complete(&self, content: &str, history: &[Message]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_request(content, history))
            .send()
            .await
            .map_err(|e| Error::Provider {
                backend: BACKEND,
                cause: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let cause = error_from_nested_body(&body, status);
            tracing::error!(status = %status, cause = %cause, "Together API error");
            return Err(Error::Provider {
                backend: BACKEND,
                cause,
            });
        }

        let result: ChatResponse = response.json().await.map_err(|e| Error::Provider {
            backend: BACKEND,
            cause: format!("malformed response: {e}"),
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::Provider {
                backend: BACKEND,
                cause: "response missing choices[0].message.content".to_string(),
            })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireTurn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
