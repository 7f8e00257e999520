//! Configuration for the completion backends

use serde::{Deserialize, Serialize};

/// System prompt shared by every backend
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Lucky, a helpful and friendly AI assistant. \
     Respond to users in a conversational, natural way. Keep responses concise but informative.";

/// Top-level completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// System prompt injected into every request
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Reply length cap, in tokens
    pub max_tokens: u32,
    /// `Hugging Face` backend configuration
    pub huggingface: HuggingFaceConfig,
    /// `OpenRouter` backend configuration
    pub openrouter: OpenRouterConfig,
    /// `Together` backend configuration
    pub together: TogetherConfig,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 800,
            huggingface: HuggingFaceConfig::default(),
            openrouter: OpenRouterConfig::default(),
            together: TogetherConfig::default(),
        }
    }
}

/// `Hugging Face` Inference API configuration (primary backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    /// Inference endpoint, model baked into the path
    pub endpoint: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/meta-llama/Llama-3-8b-chat-hf"
                .to_string(),
        }
    }
}

/// `OpenRouter` configuration (secondary backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// Chat completions endpoint
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// `HTTP-Referer` attribution header
    pub referer: String,
    /// `X-Title` attribution header
    pub app_title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "meta-llama/llama-3-8b-chat".to_string(),
            referer: "https://luckyassistant.dev".to_string(),
            app_title: "Lucky's AI Assistant".to_string(),
        }
    }
}

/// `Together` configuration (tertiary backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TogetherConfig {
    /// Chat completions endpoint
    pub endpoint: String,
    /// Model identifier
    pub model: String,
}

impl Default for TogetherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.together.xyz/v1/chat/completions".to_string(),
            model: "meta-llama/Llama-3-8b-chat-hf".to_string(),
        }
    }
}
