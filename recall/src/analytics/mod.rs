//! Pattern analysis over recall decisions
//!
//! Aggregates the decision log into summary rates, query patterns, click
//! position metrics, filter usage and time-of-use histograms, and derives
//! rule-based recommendations. Recommendations are informational only; nothing
//! here changes the ranking formula.

pub mod analyzer;
pub mod report;

pub use analyzer::{PatternAnalyzer, build_report};
pub use report::{
    FilterUsage, HitRate, PatternReport, PerformanceInsights, Priority, QueryCount,
    QueryLengthStats, QueryPatterns, QuerySuccess, Recommendation, RecommendationCategory,
    SelectionMetrics, Summary, TermCount, TopHitRates,
};
