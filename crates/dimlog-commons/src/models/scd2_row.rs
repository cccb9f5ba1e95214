use serde::{Deserialize, Serialize};

use crate::ids::{CommitSeq, EntityKey};
use crate::models::{AttributeRow, ChangeType};

/// One derived SCD2 dimension version.
///
/// Derived, never authoritative: the full row set is recomputable from the
/// change log at any time, and a new merge supersedes the previous
/// derivation rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scd2Row {
    /// Natural key of the entity
    pub key: EntityKey,
    /// Dimension payload of this version
    pub attributes: AttributeRow,
    /// Change type of the originating record
    pub operation: ChangeType,
    /// Version number, unique per key, assigned ascending by start
    pub version: u32,
    /// Commit sequence of the originating record
    pub start: CommitSeq,
    /// Commit sequence of the next record for the same key, or
    /// `CommitSeq::OPEN` if none follows
    pub end: CommitSeq,
    /// True iff the interval is open and the operation is not a delete
    pub is_active: bool,
}

impl Scd2Row {
    /// Whether this version's validity interval is still open.
    ///
    /// Note that an open interval is not the same as active: a delete as
    /// the latest record for a key leaves the interval open but the row
    /// inactive (soft delete).
    pub fn is_open(&self) -> bool {
        self.end.is_open()
    }
}
