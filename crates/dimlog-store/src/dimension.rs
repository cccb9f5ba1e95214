//! Dimension store: the materialized current state of the dimension.
//!
//! The Merge Engine reads this as its target, and the Dimension
//! Projector's output is written back into it. Keys are entity keys,
//! values are JSON-encoded attribute rows.

use std::sync::Arc;

use dimlog_commons::{AttributeRow, DimensionState, EntityKey, StorageKey};

use crate::storage_trait::{Operation, Partition, Result, StorageBackend, StorageError};

/// Point-lookup store of the current dimension rows.
pub struct DimensionStore {
    backend: Arc<dyn StorageBackend>,
    partition: Partition,
}

impl DimensionStore {
    /// Default partition name for the dimension.
    pub const DEFAULT_PARTITION: &'static str = "dimension";

    /// Open the dimension store on the default partition.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_partition(backend, Partition::new(Self::DEFAULT_PARTITION))
    }

    /// Open the dimension store on a specific partition.
    pub fn with_partition(backend: Arc<dyn StorageBackend>, partition: Partition) -> Self {
        Self { backend, partition }
    }

    /// Point lookup of one entity's current attributes.
    pub fn get(&self, key: &EntityKey) -> Result<Option<AttributeRow>> {
        match self.backend.get(&self.partition, &key.storage_key())? {
            Some(bytes) => Ok(Some(deserialize_row(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the full current state.
    pub fn load_state(&self) -> Result<DimensionState> {
        let entries = self.backend.scan(&self.partition, None, None, None)?;
        let mut state = DimensionState::new();
        for (key_bytes, value_bytes) in entries {
            let key = String::from_utf8(key_bytes)
                .map_err(|e| StorageError::serialization(e.to_string()))
                .and_then(|s| {
                    EntityKey::try_new(s).map_err(|e| StorageError::serialization(e.to_string()))
                })?;
            state.insert(key, deserialize_row(&value_bytes)?);
        }
        Ok(state)
    }

    /// Replace the stored state with a freshly projected one.
    ///
    /// Keys absent from the new state are deleted; all new entries are
    /// written in one batch.
    pub fn replace_state(&self, state: &DimensionState) -> Result<()> {
        let existing = self.backend.scan(&self.partition, None, None, None)?;

        let mut operations = Vec::with_capacity(existing.len() + state.len());
        for (key_bytes, _) in existing {
            let stale = match std::str::from_utf8(&key_bytes) {
                Ok(s) => !state
                    .keys()
                    .any(|k| k.as_str() == s),
                Err(_) => true,
            };
            if stale {
                operations.push(Operation::Delete {
                    partition: self.partition.clone(),
                    key: key_bytes,
                });
            }
        }
        for (key, attributes) in state.iter() {
            let value = serde_json::to_vec(attributes)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            operations.push(Operation::Put {
                partition: self.partition.clone(),
                key: key.storage_key(),
                value,
            });
        }

        self.backend.batch(operations)?;
        log::debug!(
            "DimensionStore: replaced state with {} entities",
            state.len()
        );
        Ok(())
    }
}

fn deserialize_row(bytes: &[u8]) -> Result<AttributeRow> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::serialization(e.to_string()))
}
