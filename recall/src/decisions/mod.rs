//! Recall decision logging and selection feedback.
//!
//! Every interaction with a result list becomes one immutable
//! [`RecallDecision`](crate::models::RecallDecision). Selections also feed the
//! chosen item's selection stats, which later searches can use as a signal.

pub mod logger;

pub use logger::{DecisionLogger, RecordRequest};
