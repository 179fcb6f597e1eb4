//! Report types produced by the pattern analyzer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Complete pattern analysis over a window of decisions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// Start of the analysis window
    pub since: DateTime<Utc>,

    /// Window length in days
    pub days: u32,

    /// User the report is restricted to, if any
    pub user_id: Option<String>,

    pub summary: Summary,
    pub query_patterns: QueryPatterns,
    pub selection_metrics: SelectionMetrics,
    pub filter_usage: BTreeMap<String, FilterUsage>,
    pub performance: PerformanceInsights,
    pub recommendations: Vec<Recommendation>,
}

/// Headline numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Summary {
    pub total_searches: usize,
    pub total_selections: usize,
    pub total_dismissals: usize,

    /// Selections per search in percent, two decimals
    pub success_rate: f64,

    /// Mean number of results shown per search, two decimals
    pub average_results_per_search: f64,
}

/// A raw query and how often it was issued
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

/// A repeated query and how often it led to a selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySuccess {
    pub query: String,
    pub occurrences: usize,
    pub selections: usize,

    /// Percent, two decimals
    pub selection_rate: f64,
}

/// A search term and how often it appeared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// What people search for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryPatterns {
    /// Most frequent raw queries
    pub frequent_queries: Vec<QueryCount>,

    /// Repeated queries ranked by selection rate
    pub successful_queries: Vec<QuerySuccess>,

    /// Most frequent free-text words
    pub search_terms: Vec<TermCount>,
}

/// Count and share of selections within the first N results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct HitRate {
    pub count: usize,

    /// Percent of all selections, one decimal
    pub percentage: f64,
}

/// Top-N hit rates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TopHitRates {
    pub top_1: HitRate,
    pub top_3: HitRate,
    pub top_5: HitRate,
    pub top_10: HitRate,
}

/// Where in the result list people click
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SelectionMetrics {
    /// Mean 1-based click position, two decimals
    pub average_click_position: f64,

    /// 1-based click position -> selections
    pub position_distribution: BTreeMap<u32, usize>,

    pub top_hits: TopHitRates,
}

/// Use and success of one filter type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FilterUsage {
    pub uses: usize,
    pub selections: usize,

    /// Percent, two decimals
    pub success_rate: f64,
}

/// Length statistics of raw queries, in characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryLengthStats {
    pub min: usize,
    pub max: usize,
    pub average: f64,
}

/// When and how people search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PerformanceInsights {
    /// Hour of day (0-23, UTC) -> searches
    pub by_hour: BTreeMap<u32, usize>,

    /// ISO day of week (1 = Monday .. 7 = Sunday) -> searches
    pub by_weekday: BTreeMap<u32, usize>,

    pub query_length: QueryLengthStats,
}

/// Area a recommendation concerns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    SearchQuality,
    Ranking,
    FailedQueries,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchQuality => write!(f, "search_quality"),
            Self::Ranking => write!(f, "ranking"),
            Self::FailedQueries => write!(f, "failed_queries"),
        }
    }
}

/// Urgency of a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// Informational tuning hint; never applied automatically
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub message: String,

    /// Example queries backing the recommendation
    pub queries: Vec<String>,
}
