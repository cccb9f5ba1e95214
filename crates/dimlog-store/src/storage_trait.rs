//! Storage backend abstraction for pluggable storage implementations.
//!
//! This module provides a trait-based abstraction layer so the collaborator
//! stores (change log, dimension) can run against different backends
//! without changing their logic.
//!
//! ## Partition Model
//!
//! Data is organized into named partitions. Different backends map
//! partitions to their native concepts (column families, trees, key
//! prefixes, map namespaces). A partition comes into existence on first
//! write; reads from an unknown partition return empty results.
//!
//! ## Ordering
//!
//! `scan` returns entries in ascending byte order of their keys. Stores
//! rely on this: the change log encodes commit sequences big-endian so a
//! scan replays commits in order.

use std::fmt;

use thiserror::Error;

use dimlog_commons::DimLogError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid append batch: {0}")]
    InvalidBatch(String),

    #[error("Stale commit sequence: last appended {last}, attempted {attempted}")]
    StaleCommit { last: String, attempted: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        StorageError::Serialization(msg.into())
    }

    /// Create an invalid-batch error
    pub fn invalid_batch<S: Into<String>>(msg: S) -> Self {
        StorageError::InvalidBatch(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        StorageError::Other(msg.into())
    }
}

impl From<StorageError> for DimLogError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(msg) => DimLogError::Serialization(msg),
            other => DimLogError::Storage(other.to_string()),
        }
    }
}

/// Represents a logical partition of data within a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    name: String,
}

impl Partition {
    /// Creates a new partition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the partition name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Partition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Partition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Represents a single operation in a batch write.
///
/// Used with `StorageBackend::batch()` for multi-operation writes.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert or update a key-value pair
    Put {
        partition: Partition,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Delete a key
    Delete { partition: Partition, key: Vec<u8> },
}

/// Trait for pluggable storage backend implementations.
///
/// Implementations must be thread-safe (Send + Sync) to allow concurrent
/// access. The engines themselves are single-threaded; thread safety is
/// for callers that share one backend across pipelines.
pub trait StorageBackend: Send + Sync {
    /// Retrieves a value by key from the specified partition.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Stores a key-value pair in the specified partition.
    ///
    /// If the key already exists, its value is updated. The partition is
    /// created if it doesn't exist.
    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()>;

    /// Deletes a key from the specified partition.
    ///
    /// Returns `Ok(())` even if the key doesn't exist (idempotent).
    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()>;

    /// Executes multiple operations in a batch.
    fn batch(&self, operations: Vec<Operation>) -> Result<()>;

    /// Scans keys in a partition in ascending key order.
    ///
    /// Returns collected (key, value) pairs.
    ///
    /// ## Parameters
    /// - `prefix`: If Some, only return keys starting with this prefix
    /// - `start_key`: If Some, start scanning from this key (inclusive)
    /// - `limit`: If Some, return at most this many entries
    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        start_key: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_creation() {
        let p1 = Partition::new("change_log");
        assert_eq!(p1.name(), "change_log");

        let p2 = Partition::from("dimension");
        assert_eq!(p2.name(), "dimension");
    }

    #[test]
    fn test_operation_construction() {
        let op = Operation::Put {
            partition: Partition::new("test"),
            key: b"key1".to_vec(),
            value: b"value1".to_vec(),
        };

        match op {
            Operation::Put {
                partition,
                key,
                value,
            } => {
                assert_eq!(partition.name(), "test");
                assert_eq!(key, b"key1");
                assert_eq!(value, b"value1");
            }
            _ => panic!("Wrong operation type"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::serialization("bad payload");
        assert_eq!(err.to_string(), "Serialization error: bad payload");

        let err = StorageError::StaleCommit {
            last: "100".to_string(),
            attempted: "90".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Stale commit sequence: last appended 100, attempted 90"
        );
    }

    #[test]
    fn test_error_converts_to_dimlog_error() {
        let err: DimLogError = StorageError::other("backend down").into();
        assert!(matches!(err, DimLogError::Storage(_)));

        let err: DimLogError = StorageError::serialization("truncated").into();
        assert!(matches!(err, DimLogError::Serialization(_)));
    }
}
