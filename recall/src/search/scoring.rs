//! Subscores of the hybrid ranking formula
//!
//! Each function maps one signal of an item to a factor, normally in [0, 1].
//! The calculator multiplies the factors by their weights and sums them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ScoringConfig, SignalWeights};
use crate::models::Item;

/// Every subscore of one item, before weighting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub base_relevance: f64,
    pub recency: f64,
    pub tag_match: f64,
    pub session_affinity: f64,
    pub type_weight: f64,
    pub title_match: f64,
    pub entity_match: f64,
    pub importance: f64,
}

impl ScoreBreakdown {
    /// Weighted contribution of every signal, in formula order
    pub fn contributions(&self, weights: &SignalWeights) -> [(&'static str, f64); 8] {
        [
            ("base_relevance", self.base_relevance * weights.base_relevance),
            ("recency", self.recency * weights.recency),
            ("tag_match", self.tag_match * weights.tag_match),
            ("session_affinity", self.session_affinity * weights.session_affinity),
            ("type_weight", self.type_weight * weights.type_weight),
            ("title_match", self.title_match * weights.title_match),
            ("entity_match", self.entity_match * weights.entity_match),
            ("importance", self.importance * weights.importance),
        ]
    }

    /// Weighted sum, rounded to two decimals and bounded to [0, 100]
    pub fn total(&self, weights: &SignalWeights) -> f64 {
        let sum: f64 = self.contributions(weights).iter().map(|(_, v)| v).sum();
        round2(sum).clamp(0.0, 100.0)
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Externally supplied relevance, bounded to [0, 1]
pub fn base_relevance(relevance: Option<f64>) -> f64 {
    match relevance {
        Some(r) if r.is_finite() => r.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Step factor for the item's age in whole days.
///
/// Items dated in the future count as created today.
pub fn recency(config: &ScoringConfig, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = now.signed_duration_since(created_at).num_days().max(0);
    config
        .recency_steps
        .iter()
        .find(|step| age_days <= step.max_age_days)
        .map(|step| step.factor)
        .unwrap_or(config.recency_floor)
}

/// Share of tags containing any query word
pub fn tag_match(item: &Item, words: &[String]) -> f64 {
    if words.is_empty() || item.tags.is_empty() {
        return 0.0;
    }
    let matched = item
        .tags
        .iter()
        .filter(|tag| contains_any(&tag.to_lowercase(), words))
        .count();
    (matched as f64 / item.tags.len().max(1) as f64).min(1.0)
}

/// 1 when the item was captured in the given session
pub fn session_affinity(item: &Item, session_id: Option<&str>) -> f64 {
    match (item.session_id(), session_id) {
        (Some(own), Some(wanted)) if own == wanted => 1.0,
        _ => 0.0,
    }
}

/// Configured weight of the item's type
pub fn type_weight(config: &ScoringConfig, item: &Item) -> f64 {
    config
        .type_weights
        .get(&item.item_type.to_string().to_lowercase())
        .copied()
        .unwrap_or(config.default_type_weight)
}

/// Exact title match scores 1, otherwise a discounted share of words found in the title
pub fn title_match(config: &ScoringConfig, item: &Item, search_terms: &str, words: &[String]) -> f64 {
    let Some(title) = item.title.as_deref() else {
        return 0.0;
    };
    if words.is_empty() {
        return 0.0;
    }

    let title = title.to_lowercase();
    if title.trim() == search_terms.trim().to_lowercase() {
        return 1.0;
    }

    let matched = words.iter().filter(|w| title.contains(w.as_str())).count();
    (config.title_partial_factor * matched as f64 / words.len() as f64).min(1.0)
}

/// Points for people, emails and urls that contain a query word
pub fn entity_match(config: &ScoringConfig, item: &Item, words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }

    let count = |values: &[String]| {
        values
            .iter()
            .filter(|v| contains_any(&v.to_lowercase(), words))
            .count() as f64
    };

    let params = &config.entity_match;
    let score = count(&item.entities.people) * params.per_person
        + count(&item.entities.emails) * params.per_email
        + count(&item.entities.urls) * params.per_url;
    score.min(1.0)
}

/// Importance/confidence factor.
///
/// Only pinned items are capped at 1.0; unpinned items can exceed it when
/// the configured factors sum above 0.5.
pub fn importance(config: &ScoringConfig, item: &Item) -> f64 {
    let params = &config.importance;
    let importance = item.importance.min(100) as f64 / 100.0;
    let confidence = item.confidence.min(100) as f64 / 100.0;
    let value =
        params.base + importance * params.importance_factor + confidence * params.confidence_factor;

    if item.pinned {
        (value + params.pin_boost).min(1.0)
    } else {
        value
    }
}

fn contains_any(haystack: &str, words: &[String]) -> bool {
    words.iter().any(|w| haystack.contains(w.as_str()))
}
