use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::AttributeValue;

/// The dimension payload of one entity version: an ordered mapping from
/// field name to scalar value.
///
/// Backed by a `BTreeMap` so iteration order, equality, and serialization
/// are deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRow {
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (field, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut values = BTreeMap::new();
        for (k, v) in pairs {
            values.insert(k.into(), v.into());
        }
        Self { values }
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&AttributeValue> {
        self.values.get(field)
    }

    /// Set a field value, returning the previous value if any
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.values.insert(field.into(), value.into())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (field, value) pairs in field order
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, AttributeValue> {
        self.values.iter()
    }

    /// Render as a JSON object (values in their tagged form)
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
