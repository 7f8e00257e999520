//! `OpenRouter` chat completions client (secondary backend)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::providers::{
    ChatProvider, CompletionConfig, WireTurn, error_from_nested_body, wire_history,
};
use crate::{Error, Result};

const BACKEND: &str = "openrouter";

/// `OpenRouter` OpenAI-shaped completion client
pub struct OpenRouterProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
    app_title: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterProvider {
    /// Create a new `OpenRouter` client
    #[must_use]
    pub fn new(api_key: String, config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.openrouter.endpoint.clone(),
            api_key,
            model: config.openrouter.model.clone(),
            referer: config.openrouter.referer.clone(),
            app_title: config.openrouter.app_title.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn complete(&self, content: &str, history: &[Message]) -> Result<String> {
        let request = build_request(
            &self.model,
            &self.system_prompt,
            self.temperature,
            self.max_tokens,
            history,
            content,
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .json(&request)
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
            tracing::error!(status = %status, cause = %cause, "OpenRouter API error");
            return Err(Error::Provider {
                backend: BACKEND,
                cause,
            });
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| Error::Provider {
            backend: BACKEND,
            cause: format!("malformed response: {e}"),
        })?;

        extract_reply(result).ok_or_else(|| Error::Provider {
            backend: BACKEND,
            cause: "response missing choices[0].message.content".to_string(),
        })
    }
}

/// Build an OpenAI-shaped chat completions request: system turn first, then
/// the mapped history, then the new user turn
pub(crate) fn build_request(
    model: &str,
    system_prompt: &str,
    temperature: f32,
    max_tokens: u32,
    history: &[Message],
    content: &str,
) -> ChatCompletionRequest {
    let mut messages = vec![WireTurn {
        role: "system",
        content: system_prompt.to_string(),
    }];
    messages.extend(wire_history(history, content));

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        temperature,
        max_tokens,
    }
}

/// Pull the reply text out of the first choice, if present and non-empty
pub(crate) fn extract_reply(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Conversation;

    #[test]
    fn request_puts_system_turn_first() {
        let mut conversation = Conversation::new();
        conversation.push_user("hi");
        conversation.push_assistant("hello");

        let request = build_request(
            "meta-llama/llama-3-8b-chat",
            "be helpful",
            0.7,
            800,
            conversation.messages(),
            "and now?",
        );

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "be helpful");
        assert_eq!(request.messages[3].role, "user");
        assert_eq!(request.messages[3].content, "and now?");
    }

    #[test]
    fn reply_extraction_takes_the_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "first"}}, {"message": {"content": "second"}}]}"#,
        )
        .expect("parses");

        assert_eq!(extract_reply(response).as_deref(), Some("first"));
    }

    #[test]
    fn reply_extraction_rejects_empty_and_missing_content() {
        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": ""}}]}"#).expect("parses");
        assert!(extract_reply(empty).is_none());

        let missing: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).expect("parses");
        assert!(extract_reply(missing).is_none());

        let no_choices: ChatCompletionResponse = serde_json::from_str("{}").expect("parses");
        assert!(extract_reply(no_choices).is_none());
    }
}
