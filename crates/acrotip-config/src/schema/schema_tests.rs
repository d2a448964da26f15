use super::*;
use std::path::PathBuf;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.detector.min_len, 2);
    assert_eq!(config.detector.max_len, 6);
    assert_eq!(config.detector.highlight, HighlightMode::Range);
    assert_eq!(config.tooltip.hide_delay_ms, 300);
    assert!(config.ai.api_key.is_none());
}

#[test]
fn test_detector_config_default() {
    let detector = DetectorConfig::default();
    assert_eq!(detector.debounce_ms, 100);
    assert_eq!(detector.context_max_chars, 500);
    assert!(detector.extra_stopwords.is_empty());
    assert!(detector.allowed_terms.is_empty());
}

#[test]
fn test_tooltip_config_default() {
    let tooltip = TooltipConfig::default();
    assert_eq!(tooltip.show_delay_ms, 200);
    assert_eq!(tooltip.hide_delay_ms, 300);
    assert_eq!(tooltip.max_other_definitions, 3);
}

#[test]
fn test_cache_config_default() {
    let cache = CacheConfig::default();
    assert_eq!(cache.primary_ttl_hours, 24);
    assert_eq!(cache.ai_ttl_hours, 4);
    assert_eq!(cache.token_ttl_hours, 1);
    assert!(cache.memory_tier);
}

#[test]
fn test_service_defaults() {
    let primary = PrimaryConfig::default();
    assert_eq!(primary.timeout_ms, 5000);
    assert!(primary.base_url.starts_with("https://"));

    let ai = AiConfig::default();
    assert_eq!(ai.model, "gpt-4o-mini");
    assert_eq!(ai.max_tokens, 150);
    assert!((ai.temperature - 0.3).abs() < f32::EPSILON);
}

#[test]
fn test_storage_resolved_path_expands_tilde() {
    let storage = StorageConfig {
        path: Some(PathBuf::from("~/acrotip.db")),
    };
    let resolved = storage.resolved_path().unwrap();
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.ends_with("acrotip.db"));
}

#[test]
fn test_storage_resolved_path_explicit() {
    let storage = StorageConfig {
        path: Some(PathBuf::from("/tmp/acrotip.db")),
    };
    assert_eq!(storage.resolved_path(), Some(PathBuf::from("/tmp/acrotip.db")));
}

#[test]
fn test_highlight_mode_serialization() {
    let json = serde_json::to_string(&HighlightMode::Marker).unwrap();
    assert_eq!(json, "\"marker\"");
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("gpt-4o-mini"));
    assert!(json.contains("\"range\""));
}
