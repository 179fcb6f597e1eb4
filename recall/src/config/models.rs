//! Configuration model definitions.
//!
//! This module contains the configuration structures for all recall components.
//! Lookup tables (type weights, autocomplete catalogs) live here and are handed to
//! the owning component at construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RecallConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Query grammar catalog
    pub catalog: ParserCatalog,

    /// Search execution configuration
    pub search: SearchConfig,

    /// Ranking formula configuration
    pub scoring: ScoringConfig,

    /// Pattern analyzer configuration
    pub analytics: AnalyticsConfig,
}

/// Catalog backing query suggestions and autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserCatalog {
    /// Types offered by autocomplete, in display order
    pub types: Vec<String>,

    /// Type suggested when the query has no type filter
    pub suggested_type: String,

    /// Tag that is always suggested
    pub suggested_tag: String,

    /// Window in days of the suggested `after:` filter
    pub recent_days: i64,
}

impl Default for ParserCatalog {
    fn default() -> Self {
        Self {
            types: ["note", "todo", "task", "meeting", "idea", "question", "insight"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            suggested_type: "todo".to_string(),
            suggested_tag: "urgent".to_string(),
            recent_days: 7,
        }
    }
}

/// Search execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit used when the request does not carry one
    pub default_limit: usize,

    /// Candidates retrieved per requested result
    pub candidate_multiplier: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            candidate_multiplier: 2,
        }
    }
}

/// Weights of the eight ranking signals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalWeights {
    pub base_relevance: f64,
    pub recency: f64,
    pub tag_match: f64,
    pub session_affinity: f64,
    pub type_weight: f64,
    pub title_match: f64,
    pub entity_match: f64,
    pub importance: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            base_relevance: 40.0,
            recency: 30.0,
            tag_match: 15.0,
            session_affinity: 10.0,
            type_weight: 5.0,
            title_match: 10.0,
            entity_match: 5.0,
            importance: 5.0,
        }
    }
}

impl SignalWeights {
    /// Every weight with its name, in formula order
    pub fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("base_relevance", self.base_relevance),
            ("recency", self.recency),
            ("tag_match", self.tag_match),
            ("session_affinity", self.session_affinity),
            ("type_weight", self.type_weight),
            ("title_match", self.title_match),
            ("entity_match", self.entity_match),
            ("importance", self.importance),
        ]
    }
}

/// One step of the recency curve: items at most `max_age_days` old get `factor`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecencyStep {
    pub max_age_days: i64,
    pub factor: f64,
}

/// Parameters of the importance/confidence subscore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportanceParams {
    pub base: f64,
    pub importance_factor: f64,
    pub confidence_factor: f64,
    pub pin_boost: f64,
}

impl Default for ImportanceParams {
    fn default() -> Self {
        Self {
            base: 0.5,
            importance_factor: 0.3,
            confidence_factor: 0.2,
            pin_boost: 0.3,
        }
    }
}

/// Parameters of the entity-match subscore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntityMatchParams {
    pub per_person: f64,
    pub per_email: f64,
    pub per_url: f64,
}

impl Default for EntityMatchParams {
    fn default() -> Self {
        Self {
            per_person: 0.3,
            per_email: 0.2,
            per_url: 0.2,
        }
    }
}

/// Ranking formula configuration, owned by the score calculator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Signal weights
    pub weights: SignalWeights,

    /// Recency steps, ascending by age
    pub recency_steps: Vec<RecencyStep>,

    /// Recency factor for items older than the last step
    pub recency_floor: f64,

    /// Per-type weights keyed by lowercase type name
    pub type_weights: HashMap<String, f64>,

    /// Weight of types missing from `type_weights`
    pub default_type_weight: f64,

    /// Title match factor for partial word matches
    pub title_partial_factor: f64,

    /// Entity match parameters
    pub entity_match: EntityMatchParams,

    /// Importance/confidence parameters
    pub importance: ImportanceParams,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let type_weights = [
            ("idea", 0.8),
            ("insight", 0.8),
            ("todo", 0.7),
            ("task", 0.7),
            ("meeting", 0.7),
            ("question", 0.6),
            ("contact", 0.6),
            ("note", 0.5),
            ("link", 0.5),
        ]
        .iter()
        .map(|(name, weight)| (name.to_string(), *weight))
        .collect();

        Self {
            weights: SignalWeights::default(),
            recency_steps: vec![
                RecencyStep { max_age_days: 0, factor: 1.0 },
                RecencyStep { max_age_days: 7, factor: 0.8 },
                RecencyStep { max_age_days: 30, factor: 0.5 },
                RecencyStep { max_age_days: 90, factor: 0.3 },
                RecencyStep { max_age_days: 365, factor: 0.1 },
            ],
            recency_floor: 0.05,
            type_weights,
            default_type_weight: 0.4,
            title_partial_factor: 0.8,
            entity_match: EntityMatchParams::default(),
            importance: ImportanceParams::default(),
        }
    }
}

/// Pattern analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Analysis window used when the caller does not pass one
    pub default_days: u32,

    /// Occurrences a query needs before its selection rate is ranked
    pub min_query_occurrences: usize,

    /// Success rate below which search quality is flagged
    pub low_success_threshold: f64,

    /// Average click position above which ranking is flagged
    pub high_position_threshold: f64,

    /// Dismissals that mark a query as failing
    pub failed_query_dismissals: usize,

    /// Length of the frequent/successful query lists
    pub top_queries: usize,

    /// Length of the search term list
    pub top_terms: usize,

    /// Failing queries named in the recommendation
    pub failed_query_examples: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_days: 30,
            min_query_occurrences: 3,
            low_success_threshold: 60.0,
            high_position_threshold: 3.0,
            failed_query_dismissals: 3,
            top_queries: 10,
            top_terms: 20,
            failed_query_examples: 3,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
