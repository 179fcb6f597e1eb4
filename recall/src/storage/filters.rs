//! Filter types for candidate retrieval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Retrieval request handed to an [`ItemStore`](super::ItemStore).
///
/// Every populated field narrows the candidate set; multi-valued fields are
/// combined with AND. Date bounds are exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CandidateQuery {
    /// Free text for relevance scoring, absent when the query has no search terms
    pub text: Option<String>,

    /// Exact item type (lowercase)
    pub item_type: Option<String>,

    /// Exact vault
    pub vault: Option<String>,

    /// Exact project
    pub project: Option<String>,

    /// Each tag must be present on the item
    pub tags: Vec<String>,

    /// Each mention must be present among the item's people
    pub mentions: Vec<String>,

    /// Item must carry at least one link-bearing field
    pub has_link: bool,

    /// Item must carry at least one code snippet
    pub has_code: bool,

    /// Exclusive lower bound on creation time
    pub created_after: Option<DateTime<Utc>>,

    /// Exclusive upper bound on creation time
    pub created_before: Option<DateTime<Utc>>,

    /// Maximum number of candidates to return
    pub limit: usize,
}

impl CandidateQuery {
    /// Whether an item satisfies every structured predicate of this query.
    ///
    /// Tag and mention containment is case-insensitive. The free-text part is not
    /// a predicate; it only drives relevance.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(item_type) = &self.item_type
            && !item.item_type.to_string().eq_ignore_ascii_case(item_type)
        {
            return false;
        }
        if self.vault.is_some() && item.vault != self.vault {
            return false;
        }
        if self.project.is_some() && item.project != self.project {
            return false;
        }

        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        if !contains_all(&tags, &self.tags) {
            return false;
        }

        if !contains_all(&item.mentions(), &self.mentions) {
            return false;
        }

        if self.has_link && !item.has_links() {
            return false;
        }
        if self.has_code && !item.has_code() {
            return false;
        }

        if let Some(after) = self.created_after
            && item.created_at <= after
        {
            return false;
        }
        if let Some(before) = self.created_before
            && item.created_at >= before
        {
            return false;
        }

        true
    }
}

/// Every wanted value is present in `values`, ignoring case
fn contains_all(values: &[&str], wanted: &[String]) -> bool {
    wanted
        .iter()
        .all(|w| values.iter().any(|v| v.eq_ignore_ascii_case(w)))
}

/// A retrieved item with its externally computed base relevance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// The item
    pub item: Item,

    /// Base relevance in [0, 1], absent when no free text was searched
    pub relevance: Option<f64>,
}

impl Candidate {
    /// Create a candidate without a relevance score
    pub fn new(item: Item) -> Self {
        Self {
            item,
            relevance: None,
        }
    }

    /// Create a candidate with a relevance score
    pub fn with_relevance(item: Item, relevance: f64) -> Self {
        Self {
            item,
            relevance: Some(relevance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemBuilder;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_empty_query_matches_everything() {
        let item = ItemBuilder::note("anything").build();
        assert!(CandidateQuery::default().matches(&item));
    }

    #[test]
    fn test_tags_are_anded() {
        let item = ItemBuilder::note("x").tag("Work").tag("urgent").build();
        let mut query = CandidateQuery {
            tags: vec!["work".to_string()],
            ..Default::default()
        };
        assert!(query.matches(&item));

        query.tags.push("home".to_string());
        assert!(!query.matches(&item));
    }

    #[test]
    fn test_mentions_use_entities_and_metadata() {
        let from_entities = ItemBuilder::note("x").person("alice").build();
        let from_metadata = ItemBuilder::note("x")
            .metadata("people", serde_json::json!(["alice"]))
            .build();
        let query = CandidateQuery {
            mentions: vec!["Alice".to_string()],
            ..Default::default()
        };
        assert!(query.matches(&from_entities));
        assert!(query.matches(&from_metadata));
        assert!(!query.matches(&ItemBuilder::note("x").build()));
    }

    #[test]
    fn test_existence_filters() {
        let linked = ItemBuilder::note("x").url("https://example.com").build();
        let code = ItemBuilder::note("x").code_snippet("fn main() {}").build();
        let link_query = CandidateQuery {
            has_link: true,
            ..Default::default()
        };
        let code_query = CandidateQuery {
            has_code: true,
            ..Default::default()
        };
        assert!(link_query.matches(&linked));
        assert!(!link_query.matches(&code));
        assert!(code_query.matches(&code));
        assert!(!code_query.matches(&linked));
    }

    #[test]
    fn test_date_bounds_are_exclusive() {
        let bound = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let at_bound = ItemBuilder::note("x").created_at(bound).build();
        let later = ItemBuilder::note("x")
            .created_at(bound + Duration::hours(1))
            .build();

        let after = CandidateQuery {
            created_after: Some(bound),
            ..Default::default()
        };
        assert!(!after.matches(&at_bound));
        assert!(after.matches(&later));

        let before = CandidateQuery {
            created_before: Some(bound),
            ..Default::default()
        };
        assert!(!before.matches(&at_bound));
    }

    #[test]
    fn test_type_vault_project_are_exact() {
        let item = ItemBuilder::todo("x").vault("personal").project("home").build();
        let query = CandidateQuery {
            item_type: Some("todo".to_string()),
            vault: Some("personal".to_string()),
            project: Some("home".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&item));

        let other_vault = CandidateQuery {
            vault: Some("work".to_string()),
            ..Default::default()
        };
        assert!(!other_vault.matches(&item));
    }
}
