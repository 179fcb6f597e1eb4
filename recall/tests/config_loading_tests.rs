//! External tests for configuration loading and initialisation

use recall::config::{ConfigLoader, LogFormat};
use recall::prelude::*;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn config_file(suffix: &str) -> NamedTempFile {
    Builder::new().suffix(suffix).tempfile().expect("temp file")
}

#[test]
fn test_yaml_file_overrides_defaults() {
    let mut file = config_file(".yaml");
    writeln!(
        file,
        "search:\n  default_limit: 5\nscoring:\n  weights:\n    recency: 20.0\nanalytics:\n  default_days: 14\nlogging:\n  format: json"
    )
    .expect("write config");

    let config = ConfigLoader::new()
        .load_file(file.path())
        .expect("load file")
        .extract()
        .expect("valid config");

    assert_eq!(config.search.default_limit, 5);
    assert_eq!(config.search.candidate_multiplier, 2);
    assert_eq!(config.scoring.weights.recency, 20.0);
    assert_eq!(config.scoring.weights.base_relevance, 40.0);
    assert_eq!(config.analytics.default_days, 14);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let mut file = config_file(".toml");
    writeln!(file, "[search]\ncandidate_multiplier = 0").expect("write config");

    let result = ConfigLoader::new()
        .load_file(file.path())
        .expect("load file")
        .extract();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_init_with_defaults() -> Result<()> {
    let manager = init_with_defaults()?;
    assert_eq!(manager.config().search.default_limit, 20);

    let results = manager.search(SearchRequest::new("anything")).await?;
    assert!(results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_builder_config_drives_search_limit() -> Result<()> {
    let config = ConfigBuilder::new().with_default_limit(1).build()?;
    let store = std::sync::Arc::new(MemoryStore::new());
    for body in ["one", "two", "three"] {
        store.insert_item(ItemBuilder::note(body).build()).await;
    }

    let manager = RecallManager::with_store(config, store);
    assert_eq!(manager.search(SearchRequest::new("")).await?.len(), 1);
    Ok(())
}
