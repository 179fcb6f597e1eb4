//! Hybrid ranking and search execution
//!
//! [`ScoreCalculator`] turns one item plus the residual search terms into a
//! bounded score in [0, 100] from eight weighted signals:
//!
//! | Signal | Default weight |
//! |---|---|
//! | Base relevance (from the item store) | 40 |
//! | Recency (step curve) | 30 |
//! | Tag match | 15 |
//! | Session affinity | 10 |
//! | Type weight | 5 |
//! | Title match | 10 |
//! | Entity match | 5 |
//! | Importance/confidence | 5 |
//!
//! [`SearchEngine`] parses the query, retrieves twice the requested number of
//! candidates, scores them and returns the top `limit` in a stable order.
//!
//! # Example
//!
//! ```
//! use recall::search::ScoreCalculator;
//! use recall::models::ItemBuilder;
//!
//! let calculator = ScoreCalculator::default();
//! let item = ItemBuilder::new_with_body("fresh item").build();
//! assert_eq!(calculator.score(&item, None, "", None), 34.5);
//! ```

pub mod calculator;
pub mod engine;
pub mod scoring;

pub use calculator::ScoreCalculator;
pub use engine::{SearchEngine, SearchHit, SearchRequest, SearchResults, build_candidate_query};
pub use scoring::ScoreBreakdown;
