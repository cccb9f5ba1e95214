//! Byte encoding seam between typed identifiers and the storage layer.

/// Types that can be encoded as storage keys.
///
/// Implementations must produce encodings whose lexicographic byte order
/// matches the type's natural order, so range scans over encoded keys
/// return entries in the expected sequence.
pub trait StorageKey {
    /// Encode this value as a storage key.
    fn storage_key(&self) -> Vec<u8>;
}
