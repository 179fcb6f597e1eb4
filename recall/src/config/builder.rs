//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating RecallConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: RecallConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: RecallConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: RecallConfig) -> Self {
        Self { config }
    }

    /// Set the result limit used when a search request carries none.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.config.search.default_limit = limit;
        self
    }

    /// Set how many candidates are retrieved per requested result.
    pub fn with_candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.config.search.candidate_multiplier = multiplier;
        self
    }

    /// Replace the ranking formula configuration.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    /// Override the weight of a single item type.
    pub fn with_type_weight(mut self, item_type: impl Into<String>, weight: f64) -> Self {
        self.config
            .scoring
            .type_weights
            .insert(item_type.into().to_lowercase(), weight);
        self
    }

    /// Replace the parser catalog.
    pub fn with_catalog(mut self, catalog: ParserCatalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    /// Set the default analysis window in days.
    pub fn with_analysis_days(mut self, days: u32) -> Self {
        self.config.analytics.default_days = days;
        self
    }

    /// Replace the analyzer configuration.
    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.config.analytics = analytics;
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self.config.logging.stdout = false;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<RecallConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }

    /// Development preset: verbose pretty logs.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Testing preset: quiet compact logs and a small default limit.
    pub fn testing() -> Self {
        Self::new()
            .with_log_level(LogLevel::Warn)
            .with_log_format(LogFormat::Compact)
            .with_default_limit(10)
    }

    /// Production preset: structured JSON logs.
    pub fn production() -> Self {
        Self::new()
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
