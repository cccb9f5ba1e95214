// Error types module
use thiserror::Error;

use crate::ids::{CommitSeq, EntityKey};

/// Result alias used throughout dimlog.
pub type Result<T> = std::result::Result<T, DimLogError>;

/// Main error type for dimlog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimLogError {
    #[error("Duplicate key in source batch: {key}")]
    DuplicateKeyInBatch { key: EntityKey },

    #[error("Non-monotonic commit sequence for key {key} at {seq}")]
    NonMonotonicCommitSequence { key: EntityKey, seq: CommitSeq },

    #[error("Multiple active rows for key: {key}")]
    MultipleActiveRowsForKey { key: EntityKey },

    #[error("Invalid entity key: {0}")]
    InvalidKey(String),

    #[error("Clock moved backwards by {millis} ms; refusing to generate commit sequence")]
    ClockMovedBackwards { millis: u64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),
}

impl DimLogError {
    /// Create a duplicate-key error for a rejected source batch
    pub fn duplicate_key(key: EntityKey) -> Self {
        DimLogError::DuplicateKeyInBatch { key }
    }

    /// Create a non-monotonic commit sequence error
    pub fn non_monotonic(key: EntityKey, seq: CommitSeq) -> Self {
        DimLogError::NonMonotonicCommitSequence { key, seq }
    }

    /// Create a multiple-active-rows invariant violation
    pub fn multiple_active(key: EntityKey) -> Self {
        DimLogError::MultipleActiveRowsForKey { key }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        DimLogError::Storage(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        DimLogError::Serialization(msg.into())
    }
}

// Conversion from String to DimLogError
impl From<String> for DimLogError {
    fn from(msg: String) -> Self {
        DimLogError::Other(msg)
    }
}
