//! Recall decision model: one record per search interaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::{FilterType, ParsedQuery};

/// What the user did with a result list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    /// The user opened one of the results
    Select,
    /// The user left without picking anything
    Dismiss,
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::Dismiss => write!(f, "dismiss"),
        }
    }
}

/// Whether a selection landed within the first N results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopHits {
    pub top_1: bool,
    pub top_3: bool,
    pub top_5: bool,
    pub top_10: bool,
}

impl TopHits {
    /// Compute the top-N flags for a 0-based index
    pub fn for_index(index: usize) -> Self {
        Self {
            top_1: index < 1,
            top_3: index < 3,
            top_5: index < 5,
            top_10: index < 10,
        }
    }
}

/// Context derived when the decision is logged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DecisionContext {
    /// 1-based click position, present only when an index was given
    pub click_depth: Option<u32>,

    /// Top-N flags, present only when an index was given
    pub top_hits: Option<TopHits>,

    /// Residual free text of the query
    pub search_terms: String,

    /// Distinct filter types used, in first-seen order
    pub filter_types: Vec<FilterType>,

    /// Session the search ran in (explicit, or from an `in:session(...)` filter)
    pub session_id: Option<String>,
}

/// Immutable record of one search interaction and its outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecallDecision {
    /// Unique identifier
    pub id: String,

    /// User who ran the search, if known
    pub user_id: Option<String>,

    /// Raw query text
    pub query: String,

    /// Parsed query snapshot
    pub parsed_query: ParsedQuery,

    /// Number of results shown
    pub total_results: usize,

    /// Ids of the results shown, in display order
    pub result_ids: Vec<String>,

    /// Item the user selected
    pub selected_item_id: Option<String>,

    /// 0-based index of the selected item, always < total_results
    pub selected_index: Option<usize>,

    /// Outcome of the interaction
    pub action: DecisionAction,

    /// Derived context
    pub context: DecisionContext,

    /// When the decision was made
    pub decided_at: DateTime<Utc>,
}

impl RecallDecision {
    /// True when the user picked a result
    pub fn is_selection(&self) -> bool {
        self.action == DecisionAction::Select
    }

    /// 1-based click position, if any
    pub fn click_depth(&self) -> Option<u32> {
        self.context.click_depth
    }
}
