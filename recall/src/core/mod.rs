//! Core interface of the recall system

pub mod recall_manager;

pub use recall_manager::RecallManager;
