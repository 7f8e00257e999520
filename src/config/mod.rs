//! Configuration management for the Lucky gateway

pub mod file;

use secrecy::SecretString;

use crate::chat::DEFAULT_GREETING;
use crate::providers::CompletionConfig;
use crate::stt::SttConfig;
use crate::voice::RecorderConfig;

/// Gateway configuration
///
/// Assembled once at startup (env > config file > default) and passed
/// explicitly into the components that need it; nothing reads ambient
/// global state after this point.
#[derive(Debug)]
pub struct Config {
    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Completion backend configuration
    pub completion: CompletionConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Recorder and silence-monitor tuning
    pub recorder: RecorderConfig,

    /// Greeting seeded into a fresh conversation
    pub greeting: String,

    /// Display name for the local identity surface
    pub display_name: Option<String>,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `Hugging Face` Inference API key (primary completion backend)
    pub huggingface: Option<SecretString>,

    /// `OpenRouter` API key (secondary completion backend)
    pub openrouter: Option<SecretString>,

    /// `Together` API key (tertiary completion backend)
    pub together: Option<SecretString>,

    /// `AssemblyAI` API key (remote transcription)
    pub assemblyai: Option<SecretString>,
}

impl Config {
    /// Load configuration with env > config file > default precedence
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();

        let api_keys = ApiKeys {
            huggingface: env_or("HF_API_KEY", fc.api_keys.huggingface),
            openrouter: env_or("OPENROUTER_API_KEY", fc.api_keys.openrouter),
            together: env_or("TOGETHER_API_KEY", fc.api_keys.together),
            assemblyai: env_or("ASSEMBLYAI_API_KEY", fc.api_keys.assemblyai),
        };

        Self {
            api_keys,
            completion: fc.completion.unwrap_or_default(),
            stt: fc.stt.unwrap_or_default(),
            recorder: fc.recorder.unwrap_or_default(),
            greeting: fc.greeting.unwrap_or_else(|| DEFAULT_GREETING.to_string()),
            display_name: std::env::var("LUCKY_USER").ok().or(fc.display_name),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            completion: CompletionConfig::default(),
            stt: SttConfig::default(),
            recorder: RecorderConfig::default(),
            greeting: DEFAULT_GREETING.to_string(),
            display_name: None,
        }
    }
}

/// Read a secret from the environment, falling back to the config file
fn env_or(var: &str, fallback: Option<String>) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or(fallback)
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_keys_and_the_stock_greeting() {
        let config = Config::default();

        assert!(config.api_keys.huggingface.is_none());
        assert!(config.api_keys.assemblyai.is_none());
        assert_eq!(config.greeting, DEFAULT_GREETING);
        assert_eq!(config.recorder.auto_stop_delay_ms, 1500);
        assert_eq!(config.stt.remote.poll_interval_ms, 1000);
    }

    #[test]
    fn env_or_prefers_the_fallback_when_var_is_unset() {
        use secrecy::ExposeSecret as _;

        let secret = env_or(
            "LUCKY_TEST_UNSET_VARIABLE",
            Some("from-file".to_string()),
        )
        .expect("fallback applies");

        assert_eq!(secret.expose_secret(), "from-file");
        assert!(env_or("LUCKY_TEST_UNSET_VARIABLE", None).is_none());
    }
}
