use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "ai.api_key"));
}

#[test]
fn test_validate_max_len_below_min_len() {
    let mut config = Config::default();
    config.detector.min_len = 4;
    config.detector.max_len = 3;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "detector.max_len"));
}

#[test]
fn test_validate_min_len_too_small() {
    let mut config = Config::default();
    config.detector.min_len = 1;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "detector.min_len"));
}

#[test]
fn test_validate_long_max_len_warning() {
    let mut config = Config::default();
    config.detector.max_len = 12;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "detector.max_len"));
}

#[test]
fn test_validate_invalid_primary_url() {
    let mut config = Config::default();
    config.primary.base_url = "wiki.local".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "primary.base_url"));
}

#[test]
fn test_validate_zero_timeout() {
    let mut config = Config::default();
    config.primary.timeout_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "primary.timeout_ms"));
}

#[test]
fn test_validate_temperature_out_of_range() {
    let mut config = Config::default();
    config.ai.temperature = 3.5;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "ai.temperature"));
}

#[test]
fn test_validate_zero_ttl_warning() {
    let mut config = Config::default();
    config.cache.ai_ttl_hours = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "cache.ai_ttl_hours"));
}

#[test]
fn test_api_key_silences_warning() {
    let mut config = Config::default();
    config.ai.api_key = Some("sk-test".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.warnings.iter().any(|w| w.path == "ai.api_key"));
}

#[test]
fn test_into_error_reports_first_error() {
    let mut config = Config::default();
    config.ai.model = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    let err = result.into_error().unwrap();
    assert!(err.to_string().contains("ai.model"));
}

#[test]
fn test_validation_result_default() {
    let result = ValidationResult::default();
    assert!(result.is_valid());
    assert!(result.into_error().is_none());
}
