use serde::{Deserialize, Serialize};

use crate::ids::{CommitSeq, EntityKey};
use crate::models::AttributeRow;

/// Kind of mutation a change record represents.
///
/// Serialized snake_case (`insert`, `update_preimage`, `update_postimage`,
/// `delete`) to match change-data-feed conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Insert,
    UpdatePreimage,
    UpdatePostimage,
    Delete,
}

impl ChangeType {
    /// Preimage records only bound the preceding interval and are
    /// suppressed from derived output.
    pub fn is_preimage(&self) -> bool {
        matches!(self, ChangeType::UpdatePreimage)
    }
}

/// One emitted mutation in the change log.
///
/// Records are append-only and immutable once written. Within one commit,
/// an `UpdatePreimage` and its `UpdatePostimage` share the commit sequence
/// with the preimage ordered first; otherwise no two records for the same
/// key share a commit sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Natural key of the affected entity
    pub key: EntityKey,
    /// Dimension payload carried by this mutation
    pub attributes: AttributeRow,
    /// Kind of mutation
    pub change_type: ChangeType,
    /// Commit point; defines global and per-key ordering
    pub commit_seq: CommitSeq,
}

impl ChangeRecord {
    pub fn new(
        key: EntityKey,
        attributes: AttributeRow,
        change_type: ChangeType,
        commit_seq: CommitSeq,
    ) -> Self {
        Self {
            key,
            attributes,
            change_type,
            commit_seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ChangeType::Insert).unwrap(),
            r#""insert""#
        );
        assert_eq!(
            serde_json::to_string(&ChangeType::UpdatePreimage).unwrap(),
            r#""update_preimage""#
        );
        assert_eq!(
            serde_json::to_string(&ChangeType::UpdatePostimage).unwrap(),
            r#""update_postimage""#
        );
        assert_eq!(
            serde_json::to_string(&ChangeType::Delete).unwrap(),
            r#""delete""#
        );
    }

    #[test]
    fn test_is_preimage() {
        assert!(ChangeType::UpdatePreimage.is_preimage());
        assert!(!ChangeType::UpdatePostimage.is_preimage());
        assert!(!ChangeType::Insert.is_preimage());
        assert!(!ChangeType::Delete.is_preimage());
    }

    #[test]
    fn test_record_roundtrip() {
        let record = ChangeRecord::new(
            EntityKey::new("Afonso"),
            AttributeRow::from_pairs([("age", 25)]),
            ChangeType::Insert,
            CommitSeq::new(1),
        );
        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: ChangeRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
