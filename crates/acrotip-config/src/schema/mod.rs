//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_services;

pub use schema_services::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub tooltip: TooltipConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub primary: PrimaryConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How candidates are painted on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Named highlight ranges, no structural change to the document.
    #[default]
    Range,
    /// Inline marker elements wrapping each occurrence.
    Marker,
}

/// Detector tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Shortest accepted token.
    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Longest accepted token.
    #[serde(default = "default_max_len")]
    pub max_len: usize,

    /// Terms rejected in addition to the built-in stopword table.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    /// Terms removed from the built-in stopword table.
    #[serde(default)]
    pub allowed_terms: Vec<String>,

    #[serde(default)]
    pub highlight: HighlightMode,

    /// Quiet window after the last mutation batch before an incremental scan.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Cap on the surrounding text sent along with AI lookups.
    #[serde(default = "default_context_max_chars")]
    pub context_max_chars: usize,
}

fn default_min_len() -> usize {
    2
}

fn default_max_len() -> usize {
    6
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_context_max_chars() -> usize {
    500
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            max_len: default_max_len(),
            extra_stopwords: Vec::new(),
            allowed_terms: Vec::new(),
            highlight: HighlightMode::default(),
            debounce_ms: default_debounce_ms(),
            context_max_chars: default_context_max_chars(),
        }
    }
}

/// Tooltip timing and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Hover time before the tooltip opens. The `tooltipDelay` preference
    /// overrides this at runtime.
    #[serde(default = "default_show_delay_ms")]
    pub show_delay_ms: u64,

    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,

    /// Secondary definitions shown under the top one.
    #[serde(default = "default_max_other_definitions")]
    pub max_other_definitions: usize,
}

fn default_show_delay_ms() -> u64 {
    200
}

fn default_hide_delay_ms() -> u64 {
    300
}

fn default_max_other_definitions() -> usize {
    3
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show_delay_ms: default_show_delay_ms(),
            hide_delay_ms: default_hide_delay_ms(),
            max_other_definitions: default_max_other_definitions(),
        }
    }
}

/// Cache lifetimes per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_primary_ttl_hours")]
    pub primary_ttl_hours: u64,

    #[serde(default = "default_ai_ttl_hours")]
    pub ai_ttl_hours: u64,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,

    /// Keep an in-process tier in front of durable storage.
    #[serde(default = "default_true")]
    pub memory_tier: bool,
}

fn default_primary_ttl_hours() -> u64 {
    24
}

fn default_ai_ttl_hours() -> u64 {
    4
}

fn default_token_ttl_hours() -> u64 {
    1
}

pub(crate) fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            primary_ttl_hours: default_primary_ttl_hours(),
            ai_ttl_hours: default_ai_ttl_hours(),
            token_ttl_hours: default_token_ttl_hours(),
            memory_tier: true,
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
