//! Pattern analyzer over recall decision history

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};

use super::report::*;
use crate::Result;
use crate::clock::Clock;
use crate::config::AnalyticsConfig;
use crate::models::RecallDecision;
use crate::storage::DecisionStore;

/// Batch analytics over the decision log.
///
/// Runs off the live search path; reads may lag concurrent decision writes.
#[derive(Clone)]
pub struct PatternAnalyzer {
    decisions: Arc<dyn DecisionStore>,
    config: AnalyticsConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PatternAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternAnalyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PatternAnalyzer {
    pub fn new(
        decisions: Arc<dyn DecisionStore>,
        config: AnalyticsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            decisions,
            config,
            clock,
        }
    }

    /// Analyze the decisions of the last `days` days (the configured default when None)
    #[instrument(skip(self))]
    pub async fn analyze(&self, user_id: Option<&str>, days: Option<u32>) -> Result<PatternReport> {
        let now = self.clock.now();
        let days = days.unwrap_or(self.config.default_days);
        // Windows reaching past the representable range cover all history
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let decisions: Vec<RecallDecision> = self
            .decisions
            .decisions_since(since, user_id.map(String::from))
            .await?
            .into_iter()
            .filter(|d| d.decided_at >= since)
            .filter(|d| user_id.is_none() || d.user_id.as_deref() == user_id)
            .collect();

        let mut report = build_report(&decisions, &self.config, now);
        report.since = since;
        report.days = days;
        report.user_id = user_id.map(String::from);

        info!(
            decisions = decisions.len(),
            recommendations = report.recommendations.len(),
            success_rate = report.summary.success_rate,
            "Pattern analysis complete"
        );
        Ok(report)
    }
}

/// Build a report from an already selected set of decisions.
///
/// Pure; never fails, and yields zeroed rates and empty lists for no decisions.
/// The window fields are set to `now` and zero days.
pub fn build_report(
    decisions: &[RecallDecision],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> PatternReport {
    let summary = summarize(decisions);
    let query_patterns = query_patterns(decisions, config);
    let selection_metrics = selection_metrics(decisions);
    let filter_usage = filter_usage(decisions);
    let performance = performance(decisions);
    let recommendations = recommendations(decisions, &summary, &selection_metrics, config);

    PatternReport {
        generated_at: now,
        since: now,
        days: 0,
        user_id: None,
        summary,
        query_patterns,
        selection_metrics,
        filter_usage,
        performance,
        recommendations,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `part / whole` in percent, 0 when `whole` is 0
fn percentage(part: usize, whole: usize, decimals: i32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, decimals)
}

fn summarize(decisions: &[RecallDecision]) -> Summary {
    let total_searches = decisions.len();
    let total_selections = decisions.iter().filter(|d| d.is_selection()).count();
    let total_results: usize = decisions.iter().map(|d| d.total_results).sum();

    Summary {
        total_searches,
        total_selections,
        total_dismissals: total_searches - total_selections,
        success_rate: percentage(total_selections, total_searches, 2),
        average_results_per_search: if total_searches == 0 {
            0.0
        } else {
            round_to(total_results as f64 / total_searches as f64, 2)
        },
    }
}

/// Per raw query: (occurrences, selections)
fn query_stats(decisions: &[RecallDecision]) -> HashMap<&str, (usize, usize)> {
    let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
    for decision in decisions {
        let entry = stats.entry(decision.query.as_str()).or_default();
        entry.0 += 1;
        if decision.is_selection() {
            entry.1 += 1;
        }
    }
    stats
}

fn query_patterns(decisions: &[RecallDecision], config: &AnalyticsConfig) -> QueryPatterns {
    let stats = query_stats(decisions);

    let mut frequent: Vec<QueryCount> = stats
        .iter()
        .map(|(query, (count, _))| QueryCount {
            query: query.to_string(),
            count: *count,
        })
        .collect();
    frequent.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
    frequent.truncate(config.top_queries);

    let mut successful: Vec<QuerySuccess> = stats
        .iter()
        .filter(|(_, (occurrences, _))| *occurrences >= config.min_query_occurrences)
        .map(|(query, (occurrences, selections))| QuerySuccess {
            query: query.to_string(),
            occurrences: *occurrences,
            selections: *selections,
            selection_rate: percentage(*selections, *occurrences, 2),
        })
        .collect();
    successful.sort_by(|a, b| {
        b.selection_rate
            .total_cmp(&a.selection_rate)
            .then_with(|| b.occurrences.cmp(&a.occurrences))
            .then_with(|| a.query.cmp(&b.query))
    });
    successful.truncate(config.top_queries);

    let mut terms: HashMap<String, usize> = HashMap::new();
    for decision in decisions {
        for word in decision.parsed_query.search_words() {
            if !word.is_empty() {
                *terms.entry(word).or_insert(0) += 1;
            }
        }
    }
    let mut search_terms: Vec<TermCount> = terms
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    search_terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    search_terms.truncate(config.top_terms);

    QueryPatterns {
        frequent_queries: frequent,
        successful_queries: successful,
        search_terms,
    }
}

/// Unrounded mean of the click depths, None when there are none
fn mean_click_position(depths: &[u32]) -> Option<f64> {
    if depths.is_empty() {
        return None;
    }
    let sum: u64 = depths.iter().map(|d| u64::from(*d)).sum();
    Some(sum as f64 / depths.len() as f64)
}

fn selection_metrics(decisions: &[RecallDecision]) -> SelectionMetrics {
    let selections: Vec<&RecallDecision> = decisions.iter().filter(|d| d.is_selection()).collect();
    let depths: Vec<u32> = selections.iter().filter_map(|d| d.click_depth()).collect();

    let mut position_distribution = BTreeMap::new();
    for depth in &depths {
        *position_distribution.entry(*depth).or_insert(0) += 1;
    }

    let average_click_position = mean_click_position(&depths)
        .map(|mean| round_to(mean, 2))
        .unwrap_or(0.0);

    let hit_rate = |n: u32| {
        let count = depths.iter().filter(|d| **d <= n).count();
        HitRate {
            count,
            percentage: percentage(count, selections.len(), 1),
        }
    };

    SelectionMetrics {
        average_click_position,
        position_distribution,
        top_hits: TopHitRates {
            top_1: hit_rate(1),
            top_3: hit_rate(3),
            top_5: hit_rate(5),
            top_10: hit_rate(10),
        },
    }
}

fn filter_usage(decisions: &[RecallDecision]) -> BTreeMap<String, FilterUsage> {
    let mut usage: BTreeMap<String, FilterUsage> = BTreeMap::new();
    for decision in decisions {
        // The stored context can be missing on old records; the parsed query never is
        let types = if decision.context.filter_types.is_empty() {
            decision.parsed_query.filter_types()
        } else {
            decision.context.filter_types.clone()
        };

        for filter_type in types {
            let entry = usage.entry(filter_type.as_str().to_string()).or_default();
            entry.uses += 1;
            if decision.is_selection() {
                entry.selections += 1;
            }
        }
    }

    for entry in usage.values_mut() {
        entry.success_rate = percentage(entry.selections, entry.uses, 2);
    }
    usage
}

fn performance(decisions: &[RecallDecision]) -> PerformanceInsights {
    let mut by_hour: BTreeMap<u32, usize> = (0..24).map(|h| (h, 0)).collect();
    let mut by_weekday: BTreeMap<u32, usize> = (1..=7).map(|d| (d, 0)).collect();

    for decision in decisions {
        *by_hour.entry(decision.decided_at.hour()).or_insert(0) += 1;
        *by_weekday
            .entry(decision.decided_at.weekday().number_from_monday())
            .or_insert(0) += 1;
    }

    let lengths: Vec<usize> = decisions.iter().map(|d| d.query.chars().count()).collect();
    let query_length = if lengths.is_empty() {
        QueryLengthStats::default()
    } else {
        QueryLengthStats {
            min: lengths.iter().copied().min().unwrap_or(0),
            max: lengths.iter().copied().max().unwrap_or(0),
            average: round_to(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64, 2),
        }
    };

    PerformanceInsights {
        by_hour,
        by_weekday,
        query_length,
    }
}

fn recommendations(
    decisions: &[RecallDecision],
    summary: &Summary,
    selection: &SelectionMetrics,
    config: &AnalyticsConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    // Thresholds compare unrounded rates; the report fields are rounded for display
    let raw_success_rate = if summary.total_searches == 0 {
        None
    } else {
        Some(summary.total_selections as f64 / summary.total_searches as f64 * 100.0)
    };
    let depths: Vec<u32> = decisions
        .iter()
        .filter(|d| d.is_selection())
        .filter_map(|d| d.click_depth())
        .collect();

    // No searches means no evidence about quality
    if raw_success_rate.is_some_and(|rate| rate < config.low_success_threshold) {
        recommendations.push(Recommendation {
            category: RecommendationCategory::SearchQuality,
            priority: Priority::High,
            message: format!(
                "Only {}% of searches end in a selection. Review relevance signals and filter suggestions.",
                summary.success_rate
            ),
            queries: Vec::new(),
        });
    }

    if mean_click_position(&depths).is_some_and(|mean| mean > config.high_position_threshold) {
        recommendations.push(Recommendation {
            category: RecommendationCategory::Ranking,
            priority: Priority::Medium,
            message: format!(
                "Selected items sit at position {} on average. Consider boosting recency or tag matches.",
                selection.average_click_position
            ),
            queries: Vec::new(),
        });
    }

    let mut dismissals: HashMap<&str, usize> = HashMap::new();
    for decision in decisions.iter().filter(|d| !d.is_selection()) {
        *dismissals.entry(decision.query.as_str()).or_insert(0) += 1;
    }
    let mut failing: Vec<(&str, usize)> = dismissals
        .into_iter()
        .filter(|(_, count)| *count >= config.failed_query_dismissals)
        .collect();
    if !failing.is_empty() {
        failing.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let queries: Vec<String> = failing
            .iter()
            .take(config.failed_query_examples)
            .map(|(query, _)| query.to_string())
            .collect();
        recommendations.push(Recommendation {
            category: RecommendationCategory::FailedQueries,
            priority: Priority::Medium,
            message: format!(
                "{} queries were dismissed repeatedly, e.g. {}.",
                failing.len(),
                queries.join(", ")
            ),
            queries,
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecisionAction, DecisionContext, TopHits};
    use crate::query::QueryParser;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // A Saturday
        Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap()
    }

    fn decision(query: &str, index: Option<usize>, at: DateTime<Utc>) -> RecallDecision {
        let parsed_query = QueryParser::default().parse_at(query, at);
        let action = if index.is_some() {
            DecisionAction::Select
        } else {
            DecisionAction::Dismiss
        };
        RecallDecision {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            query: query.to_string(),
            total_results: 10,
            result_ids: (0..10).map(|i| format!("item-{}", i)).collect(),
            selected_item_id: index.map(|i| format!("item-{}", i)),
            selected_index: index,
            action,
            context: DecisionContext {
                click_depth: index.map(|i| i as u32 + 1),
                top_hits: index.map(TopHits::for_index),
                search_terms: parsed_query.search_terms.clone(),
                filter_types: parsed_query.filter_types(),
                session_id: None,
            },
            parsed_query,
            decided_at: at,
        }
    }

    #[test]
    fn test_empty_history() {
        let report = build_report(&[], &AnalyticsConfig::default(), now());

        assert_eq!(report.summary.total_searches, 0);
        assert_eq!(report.summary.success_rate, 0.0);
        assert_eq!(report.summary.average_results_per_search, 0.0);
        assert!(report.query_patterns.frequent_queries.is_empty());
        assert!(report.query_patterns.successful_queries.is_empty());
        assert!(report.query_patterns.search_terms.is_empty());
        assert_eq!(report.selection_metrics.average_click_position, 0.0);
        assert!(report.selection_metrics.position_distribution.is_empty());
        assert_eq!(report.selection_metrics.top_hits.top_1.percentage, 0.0);
        assert!(report.filter_usage.is_empty());
        assert_eq!(report.performance.by_hour.len(), 24);
        assert_eq!(report.performance.by_weekday.len(), 7);
        assert_eq!(report.performance.query_length, QueryLengthStats::default());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_two_selects_one_dismiss() {
        let decisions = vec![
            decision("todo", Some(0), now()),
            decision("todo", Some(0), now()),
            decision("todo", None, now()),
        ];
        let report = build_report(&decisions, &AnalyticsConfig::default(), now());

        assert_eq!(report.summary.total_searches, 3);
        assert_eq!(report.summary.total_selections, 2);
        assert_eq!(report.summary.success_rate, 66.67);
        assert_eq!(report.selection_metrics.average_click_position, 1.0);
        assert_eq!(report.selection_metrics.top_hits.top_1.count, 2);
        assert_eq!(report.selection_metrics.top_hits.top_1.percentage, 100.0);

        let successful = &report.query_patterns.successful_queries;
        assert_eq!(successful.len(), 1);
        assert_eq!(successful[0].selection_rate, 66.67);
        assert_eq!(report.query_patterns.search_terms[0].term, "todo");
        assert_eq!(report.query_patterns.search_terms[0].count, 3);

        // 66.67 is above the threshold; one dismissal is not a failed query
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_selection_distribution_and_ranking_rule() {
        let decisions = vec![
            decision("a", Some(0), now()),
            decision("b", Some(4), now()),
            decision("c", Some(6), now()),
            decision("d", Some(4), now()),
        ];
        let report = build_report(&decisions, &AnalyticsConfig::default(), now());
        let metrics = &report.selection_metrics;

        // (1 + 5 + 7 + 5) / 4
        assert_eq!(metrics.average_click_position, 4.5);
        assert_eq!(metrics.position_distribution[&5], 2);
        assert_eq!(metrics.top_hits.top_3.count, 1);
        assert_eq!(metrics.top_hits.top_3.percentage, 25.0);
        assert_eq!(metrics.top_hits.top_5.count, 3);
        assert_eq!(metrics.top_hits.top_10.percentage, 100.0);

        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].category, RecommendationCategory::Ranking);
        assert_eq!(report.recommendations[0].priority, Priority::Medium);
    }

    #[test]
    fn test_all_rules_fire_together() {
        let mut decisions = Vec::new();
        for query in ["lost keys", "tax form", "wifi password", "gym plan"] {
            for _ in 0..3 {
                decisions.push(decision(query, None, now()));
            }
        }
        decisions.push(decision("tax form", None, now()));
        decisions.push(decision("recipes", Some(8), now()));

        let report = build_report(&decisions, &AnalyticsConfig::default(), now());
        let categories: Vec<RecommendationCategory> =
            report.recommendations.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::SearchQuality,
                RecommendationCategory::Ranking,
                RecommendationCategory::FailedQueries,
            ]
        );
        assert_eq!(report.recommendations[0].priority, Priority::High);

        let failed = &report.recommendations[2];
        assert_eq!(failed.queries.len(), 3);
        assert_eq!(failed.queries[0], "tax form");
    }

    #[test]
    fn test_filter_usage_and_performance() {
        let monday_morning = Utc.with_ymd_and_hms(2024, 6, 3, 8, 15, 0).unwrap();
        let decisions = vec![
            decision("#work standup", Some(0), monday_morning),
            decision("#work type:todo", None, monday_morning),
            decision("@bob", Some(1), now()),
        ];
        let report = build_report(&decisions, &AnalyticsConfig::default(), now());

        let tag = &report.filter_usage["tag"];
        assert_eq!((tag.uses, tag.selections), (2, 1));
        assert_eq!(tag.success_rate, 50.0);
        assert_eq!(report.filter_usage["type"].success_rate, 0.0);
        assert_eq!(report.filter_usage["mention"].success_rate, 100.0);

        assert_eq!(report.performance.by_hour[&8], 2);
        assert_eq!(report.performance.by_hour[&14], 1);
        assert_eq!(report.performance.by_weekday[&1], 2);
        assert_eq!(report.performance.by_weekday[&6], 1);
        assert_eq!(report.performance.query_length.min, 4);
        assert_eq!(report.performance.query_length.max, 15);
    }

    #[test]
    fn test_search_terms_ignore_filter_tokens() {
        let decisions = vec![
            decision("type:todo Groceries", None, now()),
            decision("#home groceries list", None, now()),
        ];
        let report = build_report(&decisions, &AnalyticsConfig::default(), now());
        let terms: Vec<(&str, usize)> = report
            .query_patterns
            .search_terms
            .iter()
            .map(|t| (t.term.as_str(), t.count))
            .collect();
        assert_eq!(terms, vec![("groceries", 2), ("list", 1)]);
    }

    #[test]
    fn test_ranking_rule_uses_unrounded_mean() {
        // 249 clicks at position 3 and one at 4 average 3.004
        let mut decisions: Vec<RecallDecision> =
            (0..249).map(|_| decision("notes", Some(2), now())).collect();
        decisions.push(decision("notes", Some(3), now()));

        let report = build_report(&decisions, &AnalyticsConfig::default(), now());

        assert_eq!(report.selection_metrics.average_click_position, 3.0);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].category, RecommendationCategory::Ranking);
    }

    #[tokio::test]
    async fn test_unbounded_window_covers_all_history() {
        let store = Arc::new(crate::storage::MemoryStore::new());
        store
            .insert_decision(decision("old notes", Some(0), now() - Duration::days(4000)))
            .await
            .unwrap();

        let analyzer = PatternAnalyzer::new(
            store,
            AnalyticsConfig::default(),
            Arc::new(crate::clock::FixedClock::new(now())),
        );
        let report = analyzer.analyze(None, Some(u32::MAX)).await.unwrap();

        assert_eq!(report.since, DateTime::<Utc>::MIN_UTC);
        assert_eq!(report.days, u32::MAX);
        assert_eq!(report.summary.total_searches, 1);
    }
}
