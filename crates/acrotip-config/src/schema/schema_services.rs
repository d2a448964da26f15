//! Configuration for external services (definition source, AI, storage, logging).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Primary definition source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Base URL of the definitions wiki. Also used for outbound tooltip links.
    #[serde(default = "default_primary_base_url")]
    pub base_url: String,

    #[serde(default = "default_primary_timeout_ms")]
    pub timeout_ms: u64,

    /// Bearer token for the wiki, if it requires one.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_primary_base_url() -> String {
    "https://wiki.example.com".to_string()
}

fn default_primary_timeout_ms() -> u64 {
    5000
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_primary_base_url(),
            timeout_ms: default_primary_timeout_ms(),
            token: None,
        }
    }
}

/// AI completion fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Fallback credential used when no `aiApiKey` preference is stored.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_ai_temperature")]
    pub temperature: f32,
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_max_tokens() -> u32 {
    150
}

fn default_ai_temperature() -> f32 {
    0.3
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            max_tokens: default_ai_max_tokens(),
            temperature: default_ai_temperature(),
        }
    }
}

/// Durable key-value storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured path with `~` expanded, or `<data dir>/acrotip/acrotip.db`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())),
            None => dirs::data_dir().map(|dir| dir.join("acrotip").join("acrotip.db")),
        }
    }
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}
