//! Recall manager
//!
//! This module provides the primary interface to the search-and-recall core. It
//! wires the parser, score calculator, search engine, decision logger and pattern
//! analyzer to one configuration, one clock and the external stores.

use std::sync::Arc;

use crate::Result;
use crate::analytics::{PatternAnalyzer, PatternReport};
use crate::clock::{Clock, SystemClock};
use crate::config::RecallConfig;
use crate::decisions::{DecisionLogger, RecordRequest};
use crate::models::RecallDecision;
use crate::query::{ParsedQuery, QueryParser};
use crate::search::{ScoreCalculator, SearchEngine, SearchRequest, SearchResults};
use crate::storage::{DecisionStore, ItemStore};

/// The primary interface for searching, logging decisions and analyzing them.
///
/// Cheap to clone; every component shares the same stores and clock.
#[derive(Debug, Clone)]
pub struct RecallManager {
    /// Search execution
    engine: SearchEngine,

    /// Decision logging and selection feedback
    logger: DecisionLogger,

    /// Decision history analytics
    analyzer: PatternAnalyzer,

    /// Configuration the components were built from
    config: RecallConfig,
}

impl RecallManager {
    /// Create a manager over the given stores and clock
    pub fn new(
        config: RecallConfig,
        items: Arc<dyn ItemStore>,
        decisions: Arc<dyn DecisionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let parser = QueryParser::new(config.catalog.clone(), Arc::clone(&clock));
        let calculator = ScoreCalculator::new(config.scoring.clone(), Arc::clone(&clock));

        let engine = SearchEngine::new(
            parser.clone(),
            calculator,
            Arc::clone(&items),
            config.search.clone(),
            Arc::clone(&clock),
        );
        let logger = DecisionLogger::new(parser, items, Arc::clone(&decisions), Arc::clone(&clock));
        let analyzer = PatternAnalyzer::new(decisions, config.analytics.clone(), clock);

        Self {
            engine,
            logger,
            analyzer,
            config,
        }
    }

    /// Create a manager over a single store serving both items and decisions
    pub fn with_store<S>(config: RecallConfig, store: Arc<S>) -> Self
    where
        S: ItemStore + DecisionStore,
    {
        let items: Arc<dyn ItemStore> = store.clone();
        let decisions: Arc<dyn DecisionStore> = store;
        Self::new(config, items, decisions, Arc::new(SystemClock))
    }

    /// Parse a query without searching
    pub fn parse(&self, query: &str) -> ParsedQuery {
        self.engine.parser().parse(query)
    }

    /// Search for items
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResults> {
        self.engine.search(request).await
    }

    /// Record what the user did with a result list
    pub async fn record(&self, request: RecordRequest) -> Result<RecallDecision> {
        self.logger.record(request).await
    }

    /// Analyze decision history.
    ///
    /// # Arguments
    /// * `user_id` - Restrict to one user's decisions
    /// * `days` - Window length; the configured default when None
    pub async fn analyze(&self, user_id: Option<&str>, days: Option<u32>) -> Result<PatternReport> {
        self.analyzer.analyze(user_id, days).await
    }

    /// Get the search engine
    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Get the decision logger
    pub fn logger(&self) -> &DecisionLogger {
        &self.logger
    }

    /// Get the pattern analyzer
    pub fn analyzer(&self) -> &PatternAnalyzer {
        &self.analyzer
    }

    /// Get the configuration
    pub fn config(&self) -> &RecallConfig {
        &self.config
    }
}
