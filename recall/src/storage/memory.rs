//! In-memory reference implementation of the item and decision stores.
//!
//! Suitable for tests and embedding. Relevance is a plain term-overlap ratio,
//! not a full-text ranking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Item, RecallDecision, SelectionStats, SelectionUpdate};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::filters::{Candidate, CandidateQuery};
use crate::storage::locks::SelectionLocks;
use crate::storage::traits::{DecisionStore, ItemStore};

/// In-memory item repository and decision log
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Items in insertion order
    items: RwLock<Vec<Item>>,

    /// Decisions in insertion order
    decisions: RwLock<Vec<RecallDecision>>,

    /// Serializes stats updates per item
    locks: SelectionLocks,

    fail_retrieval: AtomicBool,
    fail_stats_updates: AtomicBool,
    fail_decision_inserts: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, replacing any item with the same id. Returns the id.
    pub async fn insert_item(&self, item: Item) -> String {
        let id = item.id.clone();
        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        id
    }

    /// Snapshot of every stored item
    pub async fn items(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    /// Read-modify-write of one item's stats; callers hold the item's lock
    async fn apply_selection_update(
        &self,
        id: &str,
        update: &SelectionUpdate,
    ) -> StorageResult<SelectionStats> {
        let mut stats = {
            let items = self.items.read().await;
            items
                .iter()
                .find(|item| item.id == id)
                .map(|item| item.selection_stats.clone())
                .ok_or_else(|| StorageError::NotFound(id.to_string()))?
        };

        stats.apply(update);

        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        item.selection_stats = stats.clone();

        Ok(stats)
    }

    /// Snapshot of every stored decision
    pub async fn decisions(&self) -> Vec<RecallDecision> {
        self.decisions.read().await.clone()
    }

    /// Make candidate retrieval fail
    pub fn set_fail_retrieval(&self, fail: bool) {
        self.fail_retrieval.store(fail, Ordering::SeqCst);
    }

    /// Make selection-stat updates fail
    pub fn set_fail_stats_updates(&self, fail: bool) {
        self.fail_stats_updates.store(fail, Ordering::SeqCst);
    }

    /// Make decision inserts fail
    pub fn set_fail_decision_inserts(&self, fail: bool) {
        self.fail_decision_inserts.store(fail, Ordering::SeqCst);
    }

    /// Share of query words found in the item's title, body or tags
    fn term_overlap(item: &Item, words: &[String]) -> f64 {
        if words.is_empty() {
            return 0.0;
        }

        let mut haystack = item.body.to_lowercase();
        if let Some(title) = &item.title {
            haystack.push(' ');
            haystack.push_str(&title.to_lowercase());
        }
        for tag in &item.tags {
            haystack.push(' ');
            haystack.push_str(&tag.to_lowercase());
        }

        let matched = words.iter().filter(|w| haystack.contains(w.as_str())).count();
        matched as f64 / words.len() as f64
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn find_candidates(&self, query: &CandidateQuery) -> StorageResult<Vec<Candidate>> {
        if self.fail_retrieval.load(Ordering::SeqCst) {
            return Err(StorageError::Connection(
                "candidate retrieval unavailable".to_string(),
            ));
        }

        let items = self.items.read().await;
        let matching = items.iter().filter(|item| query.matches(item));

        let candidates: Vec<Candidate> = match &query.text {
            Some(text) => {
                let words: Vec<String> =
                    text.split_whitespace().map(|w| w.to_lowercase()).collect();
                let mut scored: Vec<Candidate> = matching
                    .filter_map(|item| {
                        let relevance = Self::term_overlap(item, &words);
                        (relevance > 0.0).then(|| Candidate::with_relevance(item.clone(), relevance))
                    })
                    .collect();
                // Stable, so equal relevance keeps insertion order
                scored.sort_by(|a, b| {
                    b.relevance
                        .unwrap_or(0.0)
                        .total_cmp(&a.relevance.unwrap_or(0.0))
                });
                scored.truncate(query.limit);
                scored
            }
            None => matching
                .take(query.limit)
                .cloned()
                .map(Candidate::new)
                .collect(),
        };

        debug!(candidates = candidates.len(), limit = query.limit, "Retrieved candidates");
        Ok(candidates)
    }

    async fn get_item(&self, id: &str) -> StorageResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn update_selection_stats(
        &self,
        id: &str,
        update: &SelectionUpdate,
    ) -> StorageResult<SelectionStats> {
        if self.fail_stats_updates.load(Ordering::SeqCst) {
            return Err(StorageError::Temporary(format!(
                "selection stats for {} are locked",
                id
            )));
        }

        if !self.items.read().await.iter().any(|item| item.id == id) {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let guard = self.locks.acquire(id).await;
        let result = self.apply_selection_update(id, update).await;
        drop(guard);
        self.locks.release(id).await;

        result
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn insert_decision(&self, decision: RecallDecision) -> StorageResult<()> {
        if self.fail_decision_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("decision log is read-only".to_string()));
        }

        let mut decisions = self.decisions.write().await;
        if decisions.iter().any(|existing| existing.id == decision.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Decision with ID {} already exists",
                decision.id
            )));
        }
        decisions.push(decision);
        Ok(())
    }

    async fn decisions_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<String>,
    ) -> StorageResult<Vec<RecallDecision>> {
        let decisions = self.decisions.read().await;
        let mut selected: Vec<RecallDecision> = decisions
            .iter()
            .filter(|d| d.decided_at >= since)
            .filter(|d| match &user_id {
                Some(user) => d.user_id.as_deref() == Some(user.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        selected.sort_by_key(|d| d.decided_at);
        Ok(selected)
    }
}
