//! # Recall
//!
//! Hybrid search and recall for a personal knowledge-capture system. The crate
//! parses a small structured query grammar, ranks candidate items with a
//! deterministic multi-factor score, records every search interaction and
//! aggregates the interaction history into tuning signals.
//!
//! ## Quick Start
//!
//! ```rust
//! use recall::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     store
//!         .insert_item(ItemBuilder::todo("Prepare meeting notes").tag("work").build())
//!         .await;
//!
//!     let manager = RecallManager::with_store(RecallConfig::default(), store);
//!
//!     // Structured filters and free text in a single query
//!     let results = manager.search(SearchRequest::new("type:todo #work meeting")).await?;
//!
//!     // Tell the system which result the user picked
//!     if let Some(hit) = results.hits.first() {
//!         manager
//!             .record(RecordRequest::select(
//!                 "type:todo #work meeting",
//!                 results.result_ids(),
//!                 hit.item.id.clone(),
//!                 0,
//!             ))
//!             .await?;
//!     }
//!
//!     let report = manager.analyze(None, None).await?;
//!     println!("success rate: {}", report.summary.success_rate);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **query**: the query grammar parser (pure)
//! - **search**: the hybrid ranking scorer (pure) and the search execution engine
//! - **decisions**: the recall decision logger and selection feedback
//! - **analytics**: the pattern analyzer over decision history
//! - **storage**: the collaborator contracts plus an in-memory reference store
//!
//! Persistent storage and full-text indexing live outside this crate; they plug in
//! through the [`storage::ItemStore`] and [`storage::DecisionStore`] traits.

pub mod analytics;
pub mod clock;
pub mod config;
pub mod core;
pub mod decisions;
pub mod logging;
pub mod models;
pub mod query;
pub mod search;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::core::RecallManager;
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{
        AnalyticsConfig, ConfigBuilder, LogLevel, LoggingConfig, RecallConfig, ScoringConfig,
        SearchConfig,
    };

    pub use crate::clock::{Clock, FixedClock, SystemClock};

    pub use crate::models::{
        DecisionAction, DecisionContext, Item, ItemBuilder, ItemType, ParsedEntities,
        RecallDecision, SelectionStats,
    };

    pub use crate::query::{FilterType, ParsedQuery, QueryFilter, QueryParser};

    pub use crate::search::{ScoreCalculator, SearchEngine, SearchHit, SearchRequest, SearchResults};

    pub use crate::decisions::{DecisionLogger, RecordRequest};

    pub use crate::analytics::{PatternAnalyzer, PatternReport, Recommendation};

    pub use crate::storage::{DecisionStore, ItemStore, MemoryStore, StorageError};

    pub use crate::{RecallError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for recall operations
#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    /// Error raised by the item repository or the decision store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// A decision request that would break the decision invariants
    #[error("Invalid recall decision: {0}")]
    InvalidDecision(String),

    /// Referenced item does not exist
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for RecallError {
    fn from(err: crate::config::ConfigError) -> Self {
        RecallError::Configuration(err.to_string())
    }
}

/// Result type for recall operations
pub type Result<T> = std::result::Result<T, RecallError>;

/// Initialize with the default configuration and an in-memory store.
///
/// Mostly useful for tests and demos; production callers plug their own stores
/// in through [`init`].
pub fn init_with_defaults() -> Result<core::RecallManager> {
    let config = config::ConfigBuilder::new().build()?;
    let store = std::sync::Arc::new(storage::MemoryStore::new());
    init(config, store.clone(), store)
}

/// Initialize logging and build a [`core::RecallManager`] over the given stores.
///
/// # Arguments
/// * `config` - The configuration for all components
/// * `items` - The item repository capability
/// * `decisions` - The append-only decision store
pub fn init(
    config: config::RecallConfig,
    items: std::sync::Arc<dyn storage::ItemStore>,
    decisions: std::sync::Arc<dyn storage::DecisionStore>,
) -> Result<core::RecallManager> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    Ok(core::RecallManager::new(
        config,
        items,
        decisions,
        std::sync::Arc::new(clock::SystemClock),
    ))
}
