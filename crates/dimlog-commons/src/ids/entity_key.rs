//! Type-safe wrapper for entity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DimLogError;
use crate::storage_key::StorageKey;

/// Type-safe wrapper for the natural key of a dimension record.
///
/// The key is unique per logical entity and stable across versions.
/// Ensures entity keys cannot be accidentally used where plain strings or
/// other identifiers are expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey(String);

impl EntityKey {
    /// Creates a new EntityKey from a string.
    ///
    /// # Panics
    /// Panics if the key is empty or contains null bytes. Use `try_new()`
    /// for fallible creation.
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        Self::try_new(key).expect("EntityKey contains invalid characters")
    }

    /// Creates a new EntityKey from a string, returning an error if
    /// validation fails.
    ///
    /// Entity keys must be non-empty and free of null bytes: they are used
    /// verbatim as storage keys.
    pub fn try_new(key: impl Into<String>) -> Result<Self, DimLogError> {
        let key = key.into();
        if key.is_empty() {
            return Err(DimLogError::InvalidKey(
                "Entity key cannot be empty".to_string(),
            ));
        }
        if key.contains('\0') {
            return Err(DimLogError::InvalidKey(
                "Entity key cannot contain null bytes".to_string(),
            ));
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityKey {
    /// Converts a &str into EntityKey.
    ///
    /// # Panics
    /// Panics if the string is empty or contains null bytes.
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityKey {
    /// Converts a String into EntityKey.
    ///
    /// # Panics
    /// Panics if the string is empty or contains null bytes.
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for EntityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl StorageKey for EntityKey {
    fn storage_key(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}
