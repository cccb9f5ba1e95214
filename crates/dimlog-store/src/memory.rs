//! In-memory storage backend.
//!
//! Partitions map to ordered key maps so scans come back in key order,
//! which the change log's commit-ordered replay depends on.

use std::collections::BTreeMap;
use std::ops::Bound;

use dashmap::DashMap;

use crate::storage_trait::{Operation, Partition, Result, StorageBackend};

/// In-memory `StorageBackend` backed by a concurrent partition map.
///
/// Each partition is a `BTreeMap<Vec<u8>, Vec<u8>>`. Partitions are created
/// lazily on first write; reads from unknown partitions return empty
/// results. Batches are applied per partition under that partition's entry
/// guard.
#[derive(Default)]
pub struct InMemoryBackend {
    partitions: DashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .partitions
            .get(partition.name())
            .and_then(|p| p.get(key).cloned()))
    }

    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        self.partitions
            .entry(partition.name().to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        if let Some(mut p) = self.partitions.get_mut(partition.name()) {
            p.remove(key);
        }
        Ok(())
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<()> {
        // Group by partition so each partition's ops apply under one guard.
        let mut grouped: BTreeMap<String, Vec<Operation>> = BTreeMap::new();
        for op in operations {
            let name = match &op {
                Operation::Put { partition, .. } => partition.name().to_string(),
                Operation::Delete { partition, .. } => partition.name().to_string(),
            };
            grouped.entry(name).or_default().push(op);
        }

        for (name, ops) in grouped {
            let mut p = self.partitions.entry(name).or_default();
            for op in ops {
                match op {
                    Operation::Put { key, value, .. } => {
                        p.insert(key, value);
                    }
                    Operation::Delete { key, .. } => {
                        p.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        start_key: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let Some(p) = self.partitions.get(partition.name()) else {
            return Ok(Vec::new());
        };

        let lower: Bound<Vec<u8>> = match (start_key, prefix) {
            (Some(start), _) => Bound::Included(start.to_vec()),
            (None, Some(prefix)) => Bound::Included(prefix.to_vec()),
            (None, None) => Bound::Unbounded,
        };

        let max = limit.unwrap_or(usize::MAX);
        let mut results = Vec::new();
        for (key, value) in p.range((lower, Bound::Unbounded)) {
            if let Some(prefix) = prefix {
                if !key.starts_with(prefix) {
                    // Keys are ordered; once past the prefix range, stop.
                    if key.as_slice() > prefix {
                        break;
                    }
                    continue;
                }
            }
            results.push((key.clone(), value.clone()));
            if results.len() >= max {
                break;
            }
        }
        Ok(results)
    }
}
