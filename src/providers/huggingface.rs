//! `Hugging Face` Inference API client (primary backend)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::providers::{ChatProvider, CompletionConfig, WireTurn, error_from_flat_body, wire_history};
use crate::{Error, Result};

const BACKEND: &str = "huggingface";

/// `Hugging Face` structured-inputs completion client
pub struct HuggingFaceProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    system_prompt: String,
    temperature: f32,
    max_new_tokens: u32,
}

impl HuggingFaceProvider {
    /// Create a new `Hugging Face` client
    #[must_use]
    pub fn new(api_key: String, config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.huggingface.endpoint.clone(),
            api_key,
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_new_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ChatProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn complete(&self, content: &str, history: &[Message]) -> Result<String> {
        let request = InferenceRequest {
            inputs: InferenceInputs {
                system: self.system_prompt.clone(),
                messages: wire_history(history, content),
            },
            parameters: InferenceParameters {
                temperature: self.temperature,
                max_new_tokens: self.max_new_tokens,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
            let cause = error_from_flat_body(&body, status);
            tracing::error!(status = %status, cause = %cause, "Hugging Face API error");
            return Err(Error::Provider {
                backend: BACKEND,
                cause,
            });
        }

        let result: InferenceResponse = response.json().await.map_err(|e| Error::Provider {
            backend: BACKEND,
            cause: format!("malformed response: {e}"),
        })?;

        match result.generated_text {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(Error::Provider {
                backend: BACKEND,
                cause: "response missing generated_text".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: InferenceInputs,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceInputs {
    system: String,
    messages: Vec<WireTurn>,
}

#[derive(Serialize)]
struct InferenceParameters {
    temperature: f32,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct InferenceResponse {
    generated_text: Option<String>,
}
