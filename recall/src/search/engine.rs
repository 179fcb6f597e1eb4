//! Search execution: parse, retrieve, score, order, truncate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::calculator::ScoreCalculator;
use crate::Result;
use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::models::Item;
use crate::query::{DateOperator, FilterType, ParsedQuery, QueryParser};
use crate::storage::{CandidateQuery, ItemStore};

/// A search as issued by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchRequest {
    /// Raw query text in the query grammar
    pub query: String,

    /// Restrict to one vault
    pub vault: Option<String>,

    /// Restrict to one project
    pub project: Option<String>,

    /// Session of the searching user, used for session affinity
    pub session_id: Option<String>,

    /// Maximum number of results; the configured default when absent
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Create a request for a raw query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Restrict to a vault
    pub fn vault(mut self, vault: impl Into<String>) -> Self {
        self.vault = Some(vault.into());
        self
    }

    /// Restrict to a project
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the searching session
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the result limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One ranked result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The matched item
    pub item: Item,

    /// Composite score in [0, 100]
    pub score: f64,

    /// 1-based position in the result list
    pub rank: usize,
}

/// Ordered search results together with the parsed query that produced them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResults {
    pub parsed_query: ParsedQuery,
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    /// Ids of the hits in display order
    pub fn result_ids(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.item.id.clone()).collect()
    }

    /// The ranked items
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.hits.iter().map(|hit| &hit.item)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Orchestrates the parser, the item store and the score calculator
#[derive(Clone)]
pub struct SearchEngine {
    parser: QueryParser,
    calculator: ScoreCalculator,
    items: Arc<dyn ItemStore>,
    config: SearchConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    /// Create an engine over an item store
    pub fn new(
        parser: QueryParser,
        calculator: ScoreCalculator,
        items: Arc<dyn ItemStore>,
        config: SearchConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            parser,
            calculator,
            items,
            config,
            clock,
        }
    }

    /// Run a search.
    ///
    /// Storage failures are returned as-is without retry. A limit of zero, or no
    /// matching candidates, yields empty results.
    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResults> {
        let now = self.clock.now();
        let parsed_query = self.parser.parse_at(&request.query, now);
        let limit = request.limit.unwrap_or(self.config.default_limit);

        if limit == 0 {
            return Ok(SearchResults {
                parsed_query,
                hits: Vec::new(),
            });
        }

        let candidate_limit = limit.saturating_mul(self.config.candidate_multiplier.max(1));
        let query = build_candidate_query(&parsed_query, &request, candidate_limit);
        let candidates = self.items.find_candidates(&query).await.map_err(|err| {
            warn!(transient = err.is_transient(), error = %err, "Candidate retrieval failed");
            err
        })?;
        debug!(candidates = candidates.len(), "Scoring candidates");

        // Explicit session wins over an in:session(...) filter
        let session_id = request
            .session_id
            .as_deref()
            .or_else(|| parsed_query.first_filter(FilterType::Session).map(|f| f.value.as_str()));

        let mut scored: Vec<(f64, Item)> = candidates
            .into_iter()
            .map(|candidate| {
                let score = self.calculator.score_at(
                    &candidate.item,
                    candidate.relevance,
                    &parsed_query.search_terms,
                    session_id,
                    now,
                );
                (score, candidate.item)
            })
            .collect();

        // sort_by is stable, so ties keep retrieval order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(limit);

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .enumerate()
            .map(|(index, (score, item))| SearchHit {
                item,
                score,
                rank: index + 1,
            })
            .collect();

        debug!(results = hits.len(), limit, "Search complete");
        Ok(SearchResults { parsed_query, hits })
    }

    /// The parser used by this engine
    pub fn parser(&self) -> &QueryParser {
        &self.parser
    }

    /// The score calculator used by this engine
    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }
}

/// Translate a parsed query into a retrieval request.
///
/// Tag and mention filters are deduplicated case-insensitively. Date filters
/// whose value is not a real calendar date are dropped.
pub fn build_candidate_query(
    parsed: &ParsedQuery,
    request: &SearchRequest,
    limit: usize,
) -> CandidateQuery {
    let distinct = |filter_type: FilterType| {
        let mut values: Vec<String> = Vec::new();
        for filter in parsed.filters_of(filter_type) {
            if !values.iter().any(|v| v.eq_ignore_ascii_case(&filter.value)) {
                values.push(filter.value.clone());
            }
        }
        values
    };

    let has = |value: &str| parsed.filters_of(FilterType::Has).any(|f| f.value == value);
    let bound = |operator: DateOperator| -> Option<DateTime<Utc>> {
        parsed.date_filter(operator).and_then(|f| f.date_bound())
    };

    CandidateQuery {
        text: (!parsed.search_terms.is_empty()).then(|| parsed.search_terms.clone()),
        item_type: parsed
            .first_filter(FilterType::Type)
            .map(|f| f.value.to_lowercase()),
        vault: request.vault.clone(),
        project: request.project.clone(),
        tags: distinct(FilterType::Tag),
        mentions: distinct(FilterType::Mention),
        has_link: has("link"),
        has_code: has("code"),
        created_after: bound(DateOperator::After),
        created_before: bound(DateOperator::Before),
        limit,
    }
}
