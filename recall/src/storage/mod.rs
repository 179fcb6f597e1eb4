//! Storage contracts and the in-memory reference store
//!
//! Persistent storage and full-text indexing are external collaborators. This
//! module defines what the search and recall components need from them:
//!
//! - [`ItemStore`]: candidate retrieval with structured filters plus a base
//!   relevance per item, and atomic per-item selection-stat updates
//! - [`DecisionStore`]: an append-only decision log with time-window reads
//!
//! [`MemoryStore`] implements both for tests and embedding.

pub mod errors;
pub mod filters;
pub mod locks;
pub mod memory;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use filters::{Candidate, CandidateQuery};
pub use locks::SelectionLocks;
pub use memory::MemoryStore;
pub use traits::{DecisionStore, ItemStore};

#[cfg(test)]
pub use traits::MockItemStore;
