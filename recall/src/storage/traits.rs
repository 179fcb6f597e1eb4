//! Collaborator contracts consumed by the search and recall components

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Item, RecallDecision, SelectionStats, SelectionUpdate};
use crate::storage::errors::StorageResult;
use crate::storage::filters::{Candidate, CandidateQuery};

/// Item repository capability.
///
/// Indexing and full-text ranking live behind this trait; the crate only reads
/// items and writes their selection counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Retrieve up to `query.limit` items matching every structured predicate.
    ///
    /// When `query.text` is present each candidate should carry a base relevance
    /// in [0, 1]. The order returned is the retrieval order used to break ties.
    async fn find_candidates(&self, query: &CandidateQuery) -> StorageResult<Vec<Candidate>>;

    /// Get an item by its ID
    async fn get_item(&self, id: &str) -> StorageResult<Option<Item>>;

    /// Fold one selection into the item's stats and return the new stats.
    ///
    /// Implementations must make the read-modify-write atomic per item, either
    /// with a row-level transaction or by serializing updates per id.
    async fn update_selection_stats(
        &self,
        id: &str,
        update: &SelectionUpdate,
    ) -> StorageResult<SelectionStats>;
}

/// Append-only store of recall decisions
#[async_trait]
pub trait DecisionStore: Send + Sync + 'static {
    /// Persist a decision. Decisions are never updated or deleted.
    async fn insert_decision(&self, decision: RecallDecision) -> StorageResult<()>;

    /// Decisions made at or after `since`, optionally for a single user, oldest first
    async fn decisions_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<String>,
    ) -> StorageResult<Vec<RecallDecision>>;
}
