use crate::config::{
    ConfigBuilder, ConfigLoader, LogFormat, LogLevel, RecallConfig, ScoringConfig, validation,
};
use std::io::Write;

#[test]
fn test_default_config() {
    let config = RecallConfig::default();
    assert_eq!(config.search.default_limit, 20);
    assert_eq!(config.search.candidate_multiplier, 2);
    assert_eq!(config.analytics.default_days, 30);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert_eq!(config.catalog.types.len(), 7);
}

#[test]
fn test_default_weights() {
    let scoring = ScoringConfig::default();
    let total: f64 = scoring.weights.named().iter().map(|(_, w)| w).sum();
    assert_eq!(total, 120.0);
    assert_eq!(scoring.type_weights.get("idea"), Some(&0.8));
    assert_eq!(scoring.type_weights.get("link"), Some(&0.5));
    assert_eq!(scoring.default_type_weight, 0.4);
    assert_eq!(scoring.recency_steps.len(), 5);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .with_default_limit(50)
        .with_candidate_multiplier(3)
        .with_type_weight("Recipe", 0.9)
        .with_analysis_days(7)
        .with_log_level(LogLevel::Debug)
        .build()
        .unwrap();

    assert_eq!(config.search.default_limit, 50);
    assert_eq!(config.search.candidate_multiplier, 3);
    assert_eq!(config.scoring.type_weights.get("recipe"), Some(&0.9));
    assert_eq!(config.analytics.default_days, 7);
    assert_eq!(config.logging.level, LogLevel::Debug);
}

#[test]
fn test_validation() {
    assert!(ConfigBuilder::new().build().is_ok());
    assert!(validation::validate_config(&RecallConfig::default()).is_ok());

    assert!(ConfigBuilder::new().with_default_limit(0).build().is_err());
    assert!(ConfigBuilder::new().with_candidate_multiplier(0).build().is_err());
    assert!(ConfigBuilder::new().with_analysis_days(0).build().is_err());
    assert!(ConfigBuilder::new().with_type_weight("note", 1.5).build().is_err());

    let mut scoring = ScoringConfig::default();
    scoring.weights.recency = -1.0;
    assert!(ConfigBuilder::new().with_scoring(scoring).build().is_err());

    let mut scoring = ScoringConfig::default();
    scoring.recency_steps.reverse();
    assert!(ConfigBuilder::new().with_scoring(scoring).build().is_err());
}

#[test]
fn test_predefined_configs() {
    let dev = ConfigBuilder::development().build().unwrap();
    let test = ConfigBuilder::testing().build().unwrap();
    let prod = ConfigBuilder::production().build().unwrap();

    assert_eq!(dev.logging.level, LogLevel::Debug);
    assert_eq!(dev.logging.format, LogFormat::Pretty);
    assert_eq!(test.search.default_limit, 10);
    assert_eq!(prod.logging.format, LogFormat::Json);
}

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recall.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[search]\ndefault_limit = 5\n\n[analytics]\ndefault_days = 14\n\n[scoring.weights]\nrecency = 20.0"
    )
    .unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(&path).unwrap();
    let config = loader.extract().unwrap();

    assert_eq!(config.search.default_limit, 5);
    assert_eq!(config.search.candidate_multiplier, 2);
    assert_eq!(config.analytics.default_days, 14);
    assert_eq!(config.scoring.weights.recency, 20.0);
    assert_eq!(config.scoring.weights.base_relevance, 40.0);
}

#[test]
fn test_load_missing_and_unsupported_files() {
    let mut loader = ConfigLoader::new();
    assert!(loader.load_file("/definitely/not/here.toml").is_err());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recall.ini");
    std::fs::write(&path, "limit=1").unwrap();
    assert!(loader.load_file(&path).is_err());

    // The loader is still usable after a rejected file
    assert!(loader.extract().is_ok());
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recall.json");
    std::fs::write(&path, r#"{"search": {"default_limit": 0}}"#).unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(&path).unwrap();
    assert!(loader.extract().is_err());
}

#[test]
fn test_config_serialization() {
    let config = ConfigBuilder::new().with_default_limit(42).build().unwrap();

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: RecallConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized.search.default_limit, 42);
    assert_eq!(deserialized.scoring, config.scoring);
}
