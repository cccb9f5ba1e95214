//! Append-only change log store.
//!
//! Records are keyed by `(commit_seq big-endian, slot)` so a plain scan
//! replays commits in order, with insertion order preserved inside a
//! commit (a preimage stays ahead of its postimage). Values are
//! bincode-encoded for compactness.

use std::sync::{Arc, Mutex};

use dimlog_commons::{ChangeRecord, CommitSeq, StorageKey};

use crate::storage_trait::{Operation, Partition, Result, StorageBackend, StorageError};

/// Maximum records in a single commit (slot suffix is a u16).
const MAX_RECORDS_PER_COMMIT: usize = u16::MAX as usize;

/// Interface of an append-only, commit-ordered change log.
///
/// Implemented by the backend-based [`ChangeLogStore`] and the file-based
/// [`FileChangeLog`](crate::FileChangeLog). The log is append-only: past
/// entries are never mutated, and each appended commit sequence must be
/// strictly greater than the last.
pub trait ChangeLog: Send + Sync {
    /// Append one commit's records; returns the appended commit sequence.
    fn append(&self, records: &[ChangeRecord]) -> Result<CommitSeq>;

    /// Replay all records from the given commit sequence (inclusive).
    fn read_from(&self, start: CommitSeq) -> Result<Vec<ChangeRecord>>;

    /// Replay the entire log in commit order.
    fn read_all(&self) -> Result<Vec<ChangeRecord>>;

    /// The last appended commit sequence, if any.
    fn last_commit(&self) -> Option<CommitSeq>;
}

/// Append-only, commit-ordered store of change records.
///
/// Appends are validated: a batch must be non-empty, every record must
/// carry the same commit sequence, and that sequence must be strictly
/// greater than the last appended one. Past entries are never mutated.
pub struct ChangeLogStore {
    backend: Arc<dyn StorageBackend>,
    partition: Partition,
    /// Last appended commit, recovered from the backend on construction.
    last_commit: Mutex<Option<CommitSeq>>,
}

impl ChangeLogStore {
    /// Default partition name for the change log.
    pub const DEFAULT_PARTITION: &'static str = "change_log";

    /// Open the change log on the default partition.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        Self::with_partition(backend, Partition::new(Self::DEFAULT_PARTITION))
    }

    /// Open the change log on a specific partition, recovering the tail
    /// from existing entries.
    pub fn with_partition(backend: Arc<dyn StorageBackend>, partition: Partition) -> Result<Self> {
        let entries = backend.scan(&partition, None, None, None)?;
        let last_commit = match entries.last() {
            Some((key, _)) => Some(decode_key(key)?),
            None => None,
        };
        if let Some(seq) = last_commit {
            log::debug!(
                "ChangeLogStore: recovered tail {} from {} entries",
                seq,
                entries.len()
            );
        }
        Ok(Self {
            backend,
            partition,
            last_commit: Mutex::new(last_commit),
        })
    }

    /// Append one commit's records to the log.
    ///
    /// All records must share one commit sequence, strictly greater than
    /// the current tail. Returns the appended commit sequence.
    pub fn append(&self, records: &[ChangeRecord]) -> Result<CommitSeq> {
        let mut last = self.last_commit.lock().unwrap();
        let commit = validate_append_batch(records, *last)?;

        let mut operations = Vec::with_capacity(records.len());
        for (slot, record) in records.iter().enumerate() {
            let value = bincode::serialize(record)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            operations.push(Operation::Put {
                partition: self.partition.clone(),
                key: encode_key(commit, slot as u16),
                value,
            });
        }
        self.backend.batch(operations)?;
        *last = Some(commit);

        log::debug!(
            "ChangeLogStore: appended {} records at commit {}",
            records.len(),
            commit
        );
        Ok(commit)
    }

    /// Replay all records from the given commit sequence (inclusive), in
    /// commit order.
    pub fn read_from(&self, start: CommitSeq) -> Result<Vec<ChangeRecord>> {
        let start_key = encode_key(start, 0);
        let entries = self
            .backend
            .scan(&self.partition, None, Some(&start_key), None)?;
        decode_entries(entries)
    }

    /// Replay the entire log in commit order.
    pub fn read_all(&self) -> Result<Vec<ChangeRecord>> {
        let entries = self.backend.scan(&self.partition, None, None, None)?;
        decode_entries(entries)
    }

    /// The last appended commit sequence, if any.
    pub fn last_commit(&self) -> Option<CommitSeq> {
        *self.last_commit.lock().unwrap()
    }
}

impl ChangeLog for ChangeLogStore {
    fn append(&self, records: &[ChangeRecord]) -> Result<CommitSeq> {
        ChangeLogStore::append(self, records)
    }

    fn read_from(&self, start: CommitSeq) -> Result<Vec<ChangeRecord>> {
        ChangeLogStore::read_from(self, start)
    }

    fn read_all(&self) -> Result<Vec<ChangeRecord>> {
        ChangeLogStore::read_all(self)
    }

    fn last_commit(&self) -> Option<CommitSeq> {
        ChangeLogStore::last_commit(self)
    }
}

/// Validate one commit's append batch against the log tail.
///
/// Shared by the backend-based and file-based logs: batch non-empty, no
/// sentinel commit, uniform commit sequence, strictly greater than `tail`.
pub(crate) fn validate_append_batch(
    records: &[ChangeRecord],
    tail: Option<CommitSeq>,
) -> Result<CommitSeq> {
    if records.is_empty() {
        return Err(StorageError::invalid_batch("append batch is empty"));
    }
    if records.len() > MAX_RECORDS_PER_COMMIT {
        return Err(StorageError::invalid_batch(format!(
            "append batch has {} records, max {}",
            records.len(),
            MAX_RECORDS_PER_COMMIT
        )));
    }

    let commit = records[0].commit_seq;
    if commit.is_open() {
        return Err(StorageError::invalid_batch(
            "cannot append the open-interval sentinel as a commit",
        ));
    }
    if let Some(mixed) = records.iter().find(|r| r.commit_seq != commit) {
        return Err(StorageError::invalid_batch(format!(
            "mixed commit sequences in batch: {} and {}",
            commit, mixed.commit_seq
        )));
    }
    if let Some(tail) = tail {
        if commit <= tail {
            return Err(StorageError::StaleCommit {
                last: tail.to_string(),
                attempted: commit.to_string(),
            });
        }
    }
    Ok(commit)
}

fn encode_key(commit: CommitSeq, slot: u16) -> Vec<u8> {
    let mut key = commit.storage_key();
    key.extend_from_slice(&slot.to_be_bytes());
    key
}

fn decode_key(key: &[u8]) -> Result<CommitSeq> {
    if key.len() < 8 {
        return Err(StorageError::serialization(format!(
            "change log key too short: {} bytes",
            key.len()
        )));
    }
    CommitSeq::from_bytes(&key[..8]).map_err(StorageError::Serialization)
}

fn decode_entries(entries: Vec<(Vec<u8>, Vec<u8>)>) -> Result<Vec<ChangeRecord>> {
    entries
        .into_iter()
        .map(|(_, value)| {
            bincode::deserialize(&value).map_err(|e| StorageError::serialization(e.to_string()))
        })
        .collect()
}
