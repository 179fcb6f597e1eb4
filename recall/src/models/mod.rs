//! Domain models for items and recall decisions

pub mod decision;
pub mod item;

// Re-export important models
pub use decision::{DecisionAction, DecisionContext, RecallDecision, TopHits};
pub use item::{
    ClickPositionStats, Item, ItemBuilder, ItemType, ParsedEntities, SelectionStats,
    SelectionUpdate,
};
