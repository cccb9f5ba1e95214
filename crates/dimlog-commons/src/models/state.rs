use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::EntityKey;
use crate::models::AttributeRow;

/// One row of an incoming source batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub key: EntityKey,
    pub attributes: AttributeRow,
}

impl SourceRow {
    pub fn new(key: impl Into<EntityKey>, attributes: AttributeRow) -> Self {
        Self {
            key: key.into(),
            attributes,
        }
    }
}

/// The current dimension state: one attribute row per active entity.
///
/// This is both the Merge Engine's view of the target and the Dimension
/// Projector's output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionState {
    entries: BTreeMap<EntityKey, AttributeRow>,
}

impl DimensionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Point lookup by entity key
    pub fn get(&self, key: &EntityKey) -> Option<&AttributeRow> {
        self.entries.get(key)
    }

    /// Whether the state contains the given key
    pub fn contains_key(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace an entity's attributes
    pub fn insert(&mut self, key: EntityKey, attributes: AttributeRow) -> Option<AttributeRow> {
        self.entries.insert(key, attributes)
    }

    /// Remove an entity
    pub fn remove(&mut self, key: &EntityKey) -> Option<AttributeRow> {
        self.entries.remove(key)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the state is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, EntityKey, AttributeRow> {
        self.entries.iter()
    }

    /// All keys in key order
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entries.keys()
    }
}

impl FromIterator<(EntityKey, AttributeRow)> for DimensionState {
    fn from_iter<I: IntoIterator<Item = (EntityKey, AttributeRow)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DimensionState {
    type Item = (EntityKey, AttributeRow);
    type IntoIter = std::collections::btree_map::IntoIter<EntityKey, AttributeRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut state = DimensionState::new();
        let key = EntityKey::new("Afonso");
        state.insert(key.clone(), AttributeRow::from_pairs([("age", 25)]));

        assert!(state.contains_key(&key));
        assert_eq!(
            state.get(&key),
            Some(&AttributeRow::from_pairs([("age", 25)]))
        );
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_from_iterator() {
        let state: DimensionState = [
            (EntityKey::new("Maria"), AttributeRow::from_pairs([("age", 30)])),
            (EntityKey::new("Afonso"), AttributeRow::from_pairs([("age", 25)])),
        ]
        .into_iter()
        .collect();

        // Key order, not insertion order
        let keys: Vec<_> = state.keys().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, vec!["Afonso", "Maria"]);
    }

    #[test]
    fn test_empty() {
        let state = DimensionState::new();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
    }
}
