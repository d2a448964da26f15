//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a `ConfigError`, if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_detector(config, &mut result);
        Self::validate_tooltip(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_primary(config, &mut result);
        Self::validate_ai(config, &mut result);

        Ok(result)
    }

    fn validate_detector(config: &Config, result: &mut ValidationResult) {
        let detector = &config.detector;
        if detector.min_len < 2 {
            result.add_error(ValidationError::new(
                "detector.min_len",
                "min_len must be at least 2",
            ));
        }

        if detector.max_len < detector.min_len {
            result.add_error(ValidationError::new(
                "detector.max_len",
                "max_len must be at least min_len",
            ));
        }

        if detector.max_len > 10 {
            result.add_warning(ValidationWarning::new(
                "detector.max_len",
                "max_len above 10 will match many ordinary shouted words",
            ));
        }

        for word in &detector.extra_stopwords {
            if word.trim().is_empty() {
                result.add_warning(ValidationWarning::new(
                    "detector.extra_stopwords",
                    "Empty stopword entry is ignored",
                ));
            }
        }

        if detector.context_max_chars == 0 {
            result.add_warning(ValidationWarning::new(
                "detector.context_max_chars",
                "context_max_chars is 0, AI lookups will be sent without page context",
            ));
        }
    }

    fn validate_tooltip(config: &Config, result: &mut ValidationResult) {
        if config.tooltip.hide_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "tooltip.hide_delay_ms",
                "hide_delay_ms is 0, the tooltip closes before the pointer can reach it",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        let cache = &config.cache;
        for (path, hours) in [
            ("cache.primary_ttl_hours", cache.primary_ttl_hours),
            ("cache.ai_ttl_hours", cache.ai_ttl_hours),
            ("cache.token_ttl_hours", cache.token_ttl_hours),
        ] {
            if hours == 0 {
                result.add_warning(ValidationWarning::new(
                    path,
                    "TTL of 0 hours disables caching for this category",
                ));
            }
        }
    }

    fn validate_primary(config: &Config, result: &mut ValidationResult) {
        let url = &config.primary.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "primary.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.primary.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "primary.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_ai(config: &Config, result: &mut ValidationResult) {
        let ai = &config.ai;
        if !ai.base_url.starts_with("http://") && !ai.base_url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "ai.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if ai.model.is_empty() {
            result.add_error(ValidationError::new("ai.model", "Model cannot be empty"));
        }

        if !(0.0..=2.0).contains(&ai.temperature) {
            result.add_error(ValidationError::new(
                "ai.temperature",
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if ai.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "ai.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }

        if ai.api_key.is_none() {
            result.add_warning(ValidationWarning::new(
                "ai.api_key",
                "API key is not set, AI fallback needs a stored credential",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
