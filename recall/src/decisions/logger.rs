//! Decision logger

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::{
    DecisionAction, DecisionContext, RecallDecision, SelectionUpdate, TopHits,
};
use crate::query::{FilterType, QueryParser};
use crate::storage::{DecisionStore, ItemStore};
use crate::{RecallError, Result};

/// Outcome of a search interaction, as reported by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordRequest {
    /// Raw query text that produced the results
    pub query: String,

    /// Ids of the results shown, in display order
    pub result_ids: Vec<String>,

    /// Item the user picked
    pub selected_item_id: Option<String>,

    /// 0-based position of the picked item
    pub selected_index: Option<usize>,

    /// What the user did
    pub action: DecisionAction,

    /// User who searched
    pub user_id: Option<String>,

    /// Session the search ran in
    pub session_id: Option<String>,
}

impl RecordRequest {
    /// The user picked `item_id` at 0-based `index`
    pub fn select(
        query: impl Into<String>,
        result_ids: Vec<String>,
        item_id: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            query: query.into(),
            result_ids,
            selected_item_id: Some(item_id.into()),
            selected_index: Some(index),
            action: DecisionAction::Select,
            user_id: None,
            session_id: None,
        }
    }

    /// The user picked an item whose position is unknown
    pub fn select_item(
        query: impl Into<String>,
        result_ids: Vec<String>,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            selected_index: None,
            ..Self::select(query, result_ids, item_id, 0)
        }
    }

    /// The user left without picking anything
    pub fn dismiss(query: impl Into<String>, result_ids: Vec<String>) -> Self {
        Self {
            query: query.into(),
            result_ids,
            selected_item_id: None,
            selected_index: None,
            action: DecisionAction::Dismiss,
            user_id: None,
            session_id: None,
        }
    }

    /// Attribute the decision to a user
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach the session the search ran in
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Reject requests that would produce a decision breaking its invariants
    fn validate(&self) -> Result<()> {
        match self.action {
            DecisionAction::Dismiss => {
                if self.selected_index.is_some() || self.selected_item_id.is_some() {
                    return Err(RecallError::InvalidDecision(
                        "a dismiss decision cannot carry a selection".to_string(),
                    ));
                }
            }
            DecisionAction::Select => {
                if let Some(index) = self.selected_index
                    && index >= self.result_ids.len()
                {
                    return Err(RecallError::InvalidDecision(format!(
                        "selected index {} is outside {} results",
                        index,
                        self.result_ids.len()
                    )));
                }
                if let (Some(index), Some(item_id)) = (self.selected_index, &self.selected_item_id)
                    && self.result_ids[index] != *item_id
                {
                    return Err(RecallError::InvalidDecision(format!(
                        "item {} is not at position {} of the results",
                        item_id, index
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Records decisions and folds selections into item stats
#[derive(Clone)]
pub struct DecisionLogger {
    parser: QueryParser,
    items: Arc<dyn ItemStore>,
    decisions: Arc<dyn DecisionStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DecisionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionLogger").finish_non_exhaustive()
    }
}

impl DecisionLogger {
    pub fn new(
        parser: QueryParser,
        items: Arc<dyn ItemStore>,
        decisions: Arc<dyn DecisionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            parser,
            items,
            decisions,
            clock,
        }
    }

    /// Record one interaction.
    ///
    /// The decision is persisted before the selection stats are touched. A failed
    /// stats update is logged and does not fail the call; a failed insert does.
    pub async fn record(&self, request: RecordRequest) -> Result<RecallDecision> {
        request.validate()?;

        let now = self.clock.now();
        let parsed_query = self.parser.parse_at(&request.query, now);

        let selected_item_id = match (&request.selected_item_id, request.selected_index) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(index)) => request.result_ids.get(index).cloned(),
            (None, None) => None,
        };

        let session_id = request.session_id.clone().or_else(|| {
            parsed_query
                .first_filter(FilterType::Session)
                .map(|f| f.value.clone())
        });

        let context = DecisionContext {
            click_depth: request.selected_index.map(|index| index as u32 + 1),
            top_hits: request.selected_index.map(TopHits::for_index),
            search_terms: parsed_query.search_terms.clone(),
            filter_types: parsed_query.filter_types(),
            session_id,
        };

        let decision = RecallDecision {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            query: request.query,
            parsed_query,
            total_results: request.result_ids.len(),
            result_ids: request.result_ids,
            selected_item_id,
            selected_index: request.selected_index,
            action: request.action,
            context,
            decided_at: now,
        };

        self.decisions.insert_decision(decision.clone()).await?;
        info!(
            decision_id = %decision.id,
            action = %decision.action,
            total_results = decision.total_results,
            "Recorded recall decision"
        );

        if decision.is_selection()
            && let Some(item_id) = &decision.selected_item_id
        {
            self.update_selection_stats(item_id, &decision).await;
        }

        Ok(decision)
    }

    async fn update_selection_stats(&self, item_id: &str, decision: &RecallDecision) {
        let update = SelectionUpdate {
            search_terms: decision.context.search_terms.clone(),
            filter_types: decision.context.filter_types.clone(),
            click_depth: decision.context.click_depth,
            selected_at: decision.decided_at,
        };

        match self.items.update_selection_stats(item_id, &update).await {
            Ok(stats) => debug!(
                item_id,
                total_selections = stats.total_selections,
                average_position = stats.click_positions.average_position,
                "Updated selection stats"
            ),
            Err(e) => warn!(
                item_id,
                decision_id = %decision.id,
                error = %e,
                "Failed to update selection stats; decision kept"
            ),
        }
    }
}
