//! Hybrid ranking score calculator
//!
//! Combines an externally supplied relevance with recency, tag, session, type,
//! title, entity and importance signals into one bounded score. The calculator
//! is pure apart from reading "now" from its clock, and never fails.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::scoring::{self, ScoreBreakdown};
use crate::clock::{Clock, SystemClock};
use crate::config::{ScoringConfig, validate_scoring_config};
use crate::models::Item;

/// Calculator for combining the ranking signals into a final score in [0, 100]
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: ScoringConfig,
    clock: Arc<dyn Clock>,
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ScoringConfig::default(), Arc::new(SystemClock))
    }
}

impl ScoreCalculator {
    /// Create a calculator. The configuration is expected to be validated already.
    pub fn new(config: ScoringConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Create a calculator, returning an error if the configuration is invalid
    pub fn try_new(config: ScoringConfig, clock: Arc<dyn Clock>) -> Result<Self, String> {
        validate_scoring_config(&config).map_err(|e| e.to_string())?;
        Ok(Self::new(config, clock))
    }

    /// Score an item against the residual search terms.
    ///
    /// # Arguments
    ///
    /// * `item` - The item being scored
    /// * `relevance` - Base relevance from the retrieval layer, if any
    /// * `search_terms` - Free text left after filter extraction
    /// * `session_id` - Session of the searching user, if any
    pub fn score(
        &self,
        item: &Item,
        relevance: Option<f64>,
        search_terms: &str,
        session_id: Option<&str>,
    ) -> f64 {
        self.score_at(item, relevance, search_terms, session_id, self.clock.now())
    }

    /// Score an item relative to a fixed instant
    pub fn score_at(
        &self,
        item: &Item,
        relevance: Option<f64>,
        search_terms: &str,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> f64 {
        self.breakdown_at(item, relevance, search_terms, session_id, now)
            .total(&self.config.weights)
    }

    /// All subscores of an item, for explaining a ranking
    pub fn breakdown(
        &self,
        item: &Item,
        relevance: Option<f64>,
        search_terms: &str,
        session_id: Option<&str>,
    ) -> ScoreBreakdown {
        self.breakdown_at(item, relevance, search_terms, session_id, self.clock.now())
    }

    fn breakdown_at(
        &self,
        item: &Item,
        relevance: Option<f64>,
        search_terms: &str,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let words: Vec<String> = search_terms
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        ScoreBreakdown {
            base_relevance: scoring::base_relevance(relevance),
            recency: scoring::recency(&self.config, item.created_at, now),
            tag_match: scoring::tag_match(item, &words),
            session_affinity: scoring::session_affinity(item, session_id),
            type_weight: scoring::type_weight(&self.config, item),
            title_match: scoring::title_match(&self.config, item, search_terms, &words),
            entity_match: scoring::entity_match(&self.config, item, &words),
            importance: scoring::importance(&self.config, item),
        }
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}
