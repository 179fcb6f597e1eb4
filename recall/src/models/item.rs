//! Item model representing a unit of captured knowledge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::query::FilterType;

/// Categorical type of an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Free-form note
    Note,
    /// Todo entry
    Todo,
    /// Task entry
    Task,
    /// Meeting notes
    Meeting,
    /// Idea
    Idea,
    /// Open question
    Question,
    /// Insight or learning
    Insight,
    /// Contact card
    Contact,
    /// Saved link
    Link,
    /// Not yet classified by the enrichment pipeline
    #[default]
    Unclassified,
    /// Any other type name
    Custom(String),
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::Todo => write!(f, "todo"),
            Self::Task => write!(f, "task"),
            Self::Meeting => write!(f, "meeting"),
            Self::Idea => write!(f, "idea"),
            Self::Question => write!(f, "question"),
            Self::Insight => write!(f, "insight"),
            Self::Contact => write!(f, "contact"),
            Self::Link => write!(f, "link"),
            Self::Unclassified => write!(f, "unclassified"),
            Self::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl ItemType {
    /// Convert a type name to an ItemType (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "note" => Self::Note,
            "todo" => Self::Todo,
            "task" => Self::Task,
            "meeting" => Self::Meeting,
            "idea" => Self::Idea,
            "question" => Self::Question,
            "insight" => Self::Insight,
            "contact" => Self::Contact,
            "link" => Self::Link,
            "unclassified" | "" => Self::Unclassified,
            other => Self::Custom(other.to_string()),
        }
    }
}

/// Entities extracted from an item's body by the enrichment pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ParsedEntities {
    pub people: Vec<String>,
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub code_snippets: Vec<String>,
    pub references: Vec<String>,
    pub hashtags: Vec<String>,
    pub dates: Vec<String>,
    pub phones: Vec<String>,
}

/// Running statistics over the 1-based positions at which an item was clicked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ClickPositionStats {
    /// Number of selections that carried a position
    pub total_clicks: u64,

    /// Incremental mean of the click depth
    pub average_position: f64,
}

/// Feedback counters accumulated from recall decisions.
///
/// This is the only part of an [`Item`] this crate ever writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SelectionStats {
    /// How many times the item was selected from a result list
    pub total_selections: u64,

    /// When the item was last selected
    pub last_selected_at: Option<DateTime<Utc>>,

    /// Residual search text -> selection count
    pub search_terms: HashMap<String, u64>,

    /// Filter type -> selection count
    pub filter_types: HashMap<String, u64>,

    /// Click position statistics
    pub click_positions: ClickPositionStats,
}

/// One selection to fold into an item's [`SelectionStats`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionUpdate {
    /// Residual search terms of the query that led to the selection
    pub search_terms: String,

    /// Distinct filter types present in the query
    pub filter_types: Vec<FilterType>,

    /// 1-based click position, when the selection came with an index
    pub click_depth: Option<u32>,

    /// When the selection happened
    pub selected_at: DateTime<Utc>,
}

impl SelectionStats {
    /// Fold one selection into the counters.
    ///
    /// The caller must hold exclusive access to the stats for the duration of the
    /// read-modify-write; the incremental mean is not safe under lost updates.
    pub fn apply(&mut self, update: &SelectionUpdate) {
        self.total_selections += 1;
        self.last_selected_at = Some(update.selected_at);

        if !update.search_terms.is_empty() {
            *self
                .search_terms
                .entry(update.search_terms.clone())
                .or_insert(0) += 1;
        }

        for filter_type in &update.filter_types {
            *self
                .filter_types
                .entry(filter_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        if let Some(depth) = update.click_depth {
            let clicks = &mut self.click_positions;
            clicks.total_clicks += 1;
            let n = clicks.total_clicks as f64;
            clicks.average_position = (clicks.average_position * (n - 1.0) + depth as f64) / n;
        }
    }
}

/// A searchable unit of captured knowledge, owned by the item repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique identifier for the item
    pub id: String,

    /// Optional title
    pub title: Option<String>,

    /// Body text
    pub body: String,

    /// Tag set
    pub tags: Vec<String>,

    /// Categorical type
    pub item_type: ItemType,

    /// Parsed entities
    pub entities: ParsedEntities,

    /// Free-form metadata (session id, people, links, urls, ...)
    pub metadata: serde_json::Value,

    /// Importance on a 0-100 scale
    pub importance: u8,

    /// Confidence on a 0-100 scale
    pub confidence: u8,

    /// Whether the user pinned the item
    pub pinned: bool,

    /// Vault the item belongs to
    pub vault: Option<String>,

    /// Project the item belongs to
    pub project: Option<String>,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// Selection feedback counters
    #[serde(default)]
    pub selection_stats: SelectionStats,
}

/// Metadata keys that can carry links
const LINK_METADATA_KEYS: &[&str] = &["links", "urls"];

impl Item {
    /// Create a new item with minimal information
    pub fn new(id: String, body: String, item_type: ItemType) -> Self {
        Self {
            id,
            title: None,
            body,
            tags: Vec::new(),
            item_type,
            entities: ParsedEntities::default(),
            metadata: serde_json::json!({}),
            importance: 0,
            confidence: 0,
            pinned: false,
            vault: None,
            project: None,
            created_at: Utc::now(),
            selection_stats: SelectionStats::default(),
        }
    }

    /// Create a builder with an auto-generated id
    pub fn builder<S: Into<String>>(body: S) -> ItemBuilder {
        ItemBuilder::new_with_body(body)
    }

    /// Session id recorded in the metadata, if any
    pub fn session_id(&self) -> Option<&str> {
        self.metadata.get("session_id").and_then(|v| v.as_str())
    }

    /// String values of a metadata array (non-strings are skipped)
    pub fn metadata_strings(&self, key: &str) -> Vec<&str> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_array())
            .map(|values| values.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// People mentioned by the item, from entities and metadata
    pub fn mentions(&self) -> Vec<&str> {
        let mut people: Vec<&str> = self.entities.people.iter().map(String::as_str).collect();
        people.extend(self.metadata_strings("people"));
        people
    }

    /// True when any link-bearing field is non-empty
    pub fn has_links(&self) -> bool {
        !self.entities.urls.is_empty()
            || LINK_METADATA_KEYS
                .iter()
                .any(|key| !self.metadata_strings(key).is_empty())
    }

    /// True when the item carries at least one code snippet
    pub fn has_code(&self) -> bool {
        !self.entities.code_snippets.is_empty()
    }

    /// Set a metadata value
    pub fn set_metadata(&mut self, key: &str, value: serde_json::Value) {
        if let serde_json::Value::Object(ref mut map) = self.metadata {
            map.insert(key.to_string(), value);
        } else {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), value);
            self.metadata = serde_json::Value::Object(map);
        }
    }
}

/// Builder for creating Item instances
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    /// Create a new item builder with a specified id
    pub fn new(id: String, body: String) -> Self {
        Self {
            item: Item::new(id, body, ItemType::Unclassified),
        }
    }

    /// Create a new item builder with an auto-generated UUID
    pub fn new_with_body<S: Into<String>>(body: S) -> Self {
        Self::new(Uuid::new_v4().to_string(), body.into())
    }

    /// Create a note (convenience method)
    pub fn note<S: Into<String>>(body: S) -> Self {
        Self::new_with_body(body).item_type(ItemType::Note)
    }

    /// Create a todo (convenience method)
    pub fn todo<S: Into<String>>(body: S) -> Self {
        Self::new_with_body(body).item_type(ItemType::Todo)
    }

    /// Create an idea (convenience method)
    pub fn idea<S: Into<String>>(body: S) -> Self {
        Self::new_with_body(body).item_type(ItemType::Idea)
    }

    /// Override the id
    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.item.id = id.into();
        self
    }

    /// Set the item type
    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item.item_type = item_type;
        self
    }

    /// Set the title
    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.item.title = Some(title.into());
        self
    }

    /// Add a single tag
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.item.tags.push(tag.into());
        self
    }

    /// Replace the tag set
    pub fn tags(mut self, tags: Vec<&str>) -> Self {
        self.item.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set the parsed entities
    pub fn entities(mut self, entities: ParsedEntities) -> Self {
        self.item.entities = entities;
        self
    }

    /// Add a person entity
    pub fn person<S: Into<String>>(mut self, person: S) -> Self {
        self.item.entities.people.push(person.into());
        self
    }

    /// Add a url entity
    pub fn url<S: Into<String>>(mut self, url: S) -> Self {
        self.item.entities.urls.push(url.into());
        self
    }

    /// Add an email entity
    pub fn email<S: Into<String>>(mut self, email: S) -> Self {
        self.item.entities.emails.push(email.into());
        self
    }

    /// Add a code snippet entity
    pub fn code_snippet<S: Into<String>>(mut self, snippet: S) -> Self {
        self.item.entities.code_snippets.push(snippet.into());
        self
    }

    /// Set a metadata value
    pub fn metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.item.set_metadata(key, value);
        self
    }

    /// Record the capture session in metadata
    pub fn session<S: Into<String>>(self, session_id: S) -> Self {
        self.metadata("session_id", serde_json::Value::String(session_id.into()))
    }

    /// Set importance (0-100)
    pub fn importance(mut self, importance: u8) -> Self {
        self.item.importance = importance;
        self
    }

    /// Set confidence (0-100)
    pub fn confidence(mut self, confidence: u8) -> Self {
        self.item.confidence = confidence;
        self
    }

    /// Pin the item
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.item.pinned = pinned;
        self
    }

    /// Set the vault
    pub fn vault<S: Into<String>>(mut self, vault: S) -> Self {
        self.item.vault = Some(vault.into());
        self
    }

    /// Set the project
    pub fn project<S: Into<String>>(mut self, project: S) -> Self {
        self.item.project = Some(project.into());
        self
    }

    /// Set the creation timestamp
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.item.created_at = created_at;
        self
    }

    /// Build the final Item instance
    pub fn build(self) -> Item {
        self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(depth: Option<u32>) -> SelectionUpdate {
        SelectionUpdate {
            search_terms: "meeting notes".to_string(),
            filter_types: vec![FilterType::Type, FilterType::Tag],
            click_depth: depth,
            selected_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_type_round_trip_names() {
        for name in ["note", "todo", "task", "meeting", "idea", "question", "insight"] {
            assert_eq!(ItemType::from_str(name).to_string(), name);
        }
        assert_eq!(ItemType::from_str("TODO"), ItemType::Todo);
        assert_eq!(
            ItemType::from_str("recipe"),
            ItemType::Custom("recipe".to_string())
        );
    }

    #[test]
    fn test_apply_selection_updates_counters() {
        let mut stats = SelectionStats::default();
        stats.apply(&update(Some(1)));
        stats.apply(&update(Some(3)));

        assert_eq!(stats.total_selections, 2);
        assert_eq!(stats.search_terms.get("meeting notes"), Some(&2));
        assert_eq!(stats.filter_types.get("type"), Some(&2));
        assert_eq!(stats.filter_types.get("tag"), Some(&2));
        assert_eq!(stats.click_positions.total_clicks, 2);
        assert!((stats.click_positions.average_position - 2.0).abs() < 1e-9);
        assert!(stats.last_selected_at.is_some());
    }

    #[test]
    fn test_apply_without_depth_keeps_average() {
        let mut stats = SelectionStats::default();
        stats.apply(&update(Some(4)));
        stats.apply(&update(None));

        assert_eq!(stats.total_selections, 2);
        assert_eq!(stats.click_positions.total_clicks, 1);
        assert!((stats.click_positions.average_position - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_link_and_code_detection() {
        let plain = ItemBuilder::note("plain").build();
        assert!(!plain.has_links());
        assert!(!plain.has_code());

        let with_url = ItemBuilder::note("x").url("https://example.com").build();
        assert!(with_url.has_links());

        let with_meta_link = ItemBuilder::note("x")
            .metadata("links", serde_json::json!(["https://a.b"]))
            .build();
        assert!(with_meta_link.has_links());

        let empty_meta_link = ItemBuilder::note("x")
            .metadata("urls", serde_json::json!([]))
            .build();
        assert!(!empty_meta_link.has_links());

        let with_code = ItemBuilder::note("x").code_snippet("fn main() {}").build();
        assert!(with_code.has_code());
    }

    #[test]
    fn test_mentions_merge_entities_and_metadata() {
        let item = ItemBuilder::note("x")
            .person("alice")
            .metadata("people", serde_json::json!(["bob", 3]))
            .build();
        assert_eq!(item.mentions(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_session_id_from_metadata() {
        let item = ItemBuilder::note("x").session("s-1").build();
        assert_eq!(item.session_id(), Some("s-1"));
        assert_eq!(ItemBuilder::note("x").build().session_id(), None);
    }
}
