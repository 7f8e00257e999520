//! TOML configuration file loading
//!
//! Supports `~/.config/lucky/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of
//! defaults, and environment variables override the file.

use std::path::PathBuf;

use serde::Deserialize;

use crate::providers::CompletionConfig;
use crate::stt::SttConfig;
use crate::voice::RecorderConfig;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LuckyConfigFile {
    /// Greeting seeded into a fresh conversation
    #[serde(default)]
    pub greeting: Option<String>,

    /// Display name for the local identity surface
    #[serde(default)]
    pub display_name: Option<String>,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Completion backend configuration
    #[serde(default)]
    pub completion: Option<CompletionConfig>,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: Option<SttConfig>,

    /// Recorder and silence-monitor tuning
    #[serde(default)]
    pub recorder: Option<RecorderConfig>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub huggingface: Option<String>,
    pub openrouter: Option<String>,
    pub together: Option<String>,
    pub assemblyai: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `LuckyConfigFile::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config_file() -> LuckyConfigFile {
    let Some(path) = config_file_path() else {
        return LuckyConfigFile::default();
    };

    if !path.exists() {
        return LuckyConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LuckyConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LuckyConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/lucky/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("lucky").join("config.toml"))
}
