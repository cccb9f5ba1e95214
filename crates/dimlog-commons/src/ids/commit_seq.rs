//! CommitSeq - commit sequence identifier based on Snowflake IDs
//!
//! Commit sequences define both the global append order of the change log
//! and the per-key version order of derived SCD2 rows. Each value embeds
//! its creation timestamp.

use std::fmt;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_key::StorageKey;

/// Commit sequence for change-log ordering
///
/// Internally uses Snowflake ID format (64 bits):
/// - 41 bits: timestamp in milliseconds since custom epoch
/// - 10 bits: machine/worker ID
/// - 12 bits: sequence number
///
/// `CommitSeq::OPEN` is the open-interval sentinel: an SCD2 row whose end
/// equals `OPEN` has no successor yet. It compares greater than every
/// generated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitSeq(i64);

impl CommitSeq {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (same as CommitSeqGenerator)
    pub const EPOCH: u64 = 1704067200000;

    /// Open-interval sentinel, the maximum representable sequence.
    pub const OPEN: CommitSeq = CommitSeq(i64::MAX);

    /// Create a CommitSeq from a raw Snowflake value
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw i64 value
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether this is the open-interval sentinel
    pub fn is_open(&self) -> bool {
        *self == Self::OPEN
    }

    /// Extract timestamp in milliseconds since Unix epoch
    pub fn timestamp_millis(&self) -> u64 {
        let id = self.0 as u64;
        (id >> 22) + Self::EPOCH
    }

    /// Render the embedded timestamp as RFC 3339, or `"open"` for the sentinel.
    ///
    /// Useful for display and log output; storage always uses the raw value.
    pub fn timestamp_rfc3339(&self) -> String {
        if self.is_open() {
            return "open".to_string();
        }
        match Utc.timestamp_millis_opt(self.timestamp_millis() as i64) {
            chrono::LocalResult::Single(dt) => dt.to_rfc3339(),
            _ => self.0.to_string(),
        }
    }

    /// Convert to bytes (big-endian, so byte order matches numeric order)
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parse from bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() != 8 {
            return Err(format!("Invalid byte length: expected 8, got {}", bytes.len()));
        }
        let mut array = [0u8; 8];
        array.copy_from_slice(bytes);
        Ok(Self::new(i64::from_be_bytes(array)))
    }
}

impl fmt::Display for CommitSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            write!(f, "open")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<i64> for CommitSeq {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<CommitSeq> for i64 {
    fn from(seq: CommitSeq) -> Self {
        seq.0
    }
}

impl StorageKey for CommitSeq {
    fn storage_key(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_seq_creation() {
        let seq = CommitSeq::new(123456789);
        assert_eq!(seq.as_i64(), 123456789);
        assert!(!seq.is_open());
    }

    #[test]
    fn test_open_sentinel() {
        assert!(CommitSeq::OPEN.is_open());
        assert_eq!(CommitSeq::OPEN.to_string(), "open");
        assert_eq!(CommitSeq::OPEN.timestamp_rfc3339(), "open");
    }

    #[test]
    fn test_open_greater_than_everything() {
        let seq = CommitSeq::new(i64::MAX - 1);
        assert!(seq < CommitSeq::OPEN);
    }

    #[test]
    fn test_timestamp_extraction() {
        let timestamp_offset = 1000u64; // 1000ms after epoch
        let id = (timestamp_offset << 22) as i64;
        let seq = CommitSeq::new(id);
        assert_eq!(seq.timestamp_millis(), CommitSeq::EPOCH + timestamp_offset);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let seq = CommitSeq::new(987654321);
        let parsed = CommitSeq::from_bytes(&seq.to_bytes()).unwrap();
        assert_eq!(parsed, seq);
    }

    #[test]
    fn test_bytes_preserve_order() {
        let a = CommitSeq::new(100);
        let b = CommitSeq::new(200);
        assert!(a.to_bytes() < b.to_bytes());
    }

    #[test]
    fn test_invalid_byte_length() {
        assert!(CommitSeq::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_ordering() {
        let s1 = CommitSeq::new(100);
        let s2 = CommitSeq::new(200);
        assert!(s1 < s2);
    }
}
