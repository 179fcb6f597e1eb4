//! Error types for storage operations

use std::error::Error;
use std::fmt;

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    Connection(String),

    /// Query error
    Query(String),

    /// Transaction error
    Transaction(String),

    /// Validation error
    Validation(String),

    /// Data not found
    NotFound(String),

    /// Item already exists
    AlreadyExists(String),

    /// Backend-specific error
    Backend(String),

    /// Serialization/deserialization error
    Serialization(String),

    /// Storage timeout error
    Timeout(String),

    /// Temporary/transient error
    Temporary(String),

    /// Internal error
    Internal(String),

    /// Other error
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Connection(_) | StorageError::Timeout(_) | StorageError::Temporary(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StorageError::Query(msg) => write!(f, "Query error: {}", msg),
            StorageError::Transaction(msg) => write!(f, "Transaction error: {}", msg),
            StorageError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StorageError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StorageError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            StorageError::Backend(msg) => write!(f, "Backend error: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            StorageError::Temporary(msg) => write!(f, "Temporary error: {}", msg),
            StorageError::Internal(msg) => write!(f, "Internal error: {}", msg),
            StorageError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl Error for StorageError {}

/// Convert a JSON error to a storage error
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Convert a standard IO error to a storage error
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Convert StorageError to RecallError
impl From<StorageError> for crate::RecallError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => crate::RecallError::ItemNotFound(id),
            other => crate::RecallError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecallError;

    #[test]
    fn test_not_found_maps_to_item_not_found() {
        let err: RecallError = StorageError::NotFound("item-1".to_string()).into();
        assert!(matches!(err, RecallError::ItemNotFound(ref id) if id == "item-1"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let err: RecallError = StorageError::Timeout("5s elapsed".to_string()).into();
        assert_eq!(err.to_string(), "Storage error: Timeout: 5s elapsed");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::Temporary("busy".into()).is_transient());
        assert!(!StorageError::Validation("bad".into()).is_transient());
    }
}
