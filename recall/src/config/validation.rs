//! Configuration validation utilities.
//!
//! This module provides validation functions for configuration values.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &RecallConfig) -> Result<(), ConfigError> {
    validate_catalog(&config.catalog)?;
    validate_search_config(&config.search)?;
    validate_scoring_config(&config.scoring)?;
    validate_analytics_config(&config.analytics)?;
    Ok(())
}

fn validate_catalog(catalog: &ParserCatalog) -> Result<(), ConfigError> {
    if catalog.suggested_type.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Suggested type cannot be empty".to_string(),
        ));
    }
    if catalog.suggested_tag.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Suggested tag cannot be empty".to_string(),
        ));
    }
    if catalog.recent_days <= 0 {
        return Err(ConfigError::ValidationError(
            "recent_days must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.default_limit == 0 {
        return Err(ConfigError::ValidationError(
            "default_limit must be greater than 0".to_string(),
        ));
    }
    if config.candidate_multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "candidate_multiplier must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_scoring_config(config: &ScoringConfig) -> Result<(), ConfigError> {
    for (name, weight) in config.weights.named() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{} weight must be a finite value >= 0.0",
                name
            )));
        }
    }

    let ages: Vec<i64> = config.recency_steps.iter().map(|s| s.max_age_days).collect();
    if ages.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ConfigError::ValidationError(
            "recency_steps must be strictly ascending by max_age_days".to_string(),
        ));
    }
    if config
        .recency_steps
        .iter()
        .map(|s| s.factor)
        .chain(std::iter::once(config.recency_floor))
        .any(|f| !(0.0..=1.0).contains(&f))
    {
        return Err(ConfigError::ValidationError(
            "recency factors must be within 0.0..=1.0".to_string(),
        ));
    }

    if config
        .type_weights
        .values()
        .chain(std::iter::once(&config.default_type_weight))
        .any(|w| !(0.0..=1.0).contains(w))
    {
        return Err(ConfigError::ValidationError(
            "type weights must be within 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_analytics_config(config: &AnalyticsConfig) -> Result<(), ConfigError> {
    if config.default_days == 0 {
        return Err(ConfigError::ValidationError(
            "default_days must be greater than 0".to_string(),
        ));
    }
    if config.min_query_occurrences == 0 || config.failed_query_dismissals == 0 {
        return Err(ConfigError::ValidationError(
            "query occurrence thresholds must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
