//! File-backed change log.
//!
//! One JSON-encoded record per line, appended in commit order. Opening an
//! existing file replays it to recover the tail, so the monotonic-append
//! guarantee survives process restarts.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dimlog_commons::{ChangeRecord, CommitSeq};

use crate::change_log::validate_append_batch;
use crate::storage_trait::{Result, StorageError};

/// Append-only change log persisted as a JSON-lines file.
#[derive(Debug)]
pub struct FileChangeLog {
    path: PathBuf,
    last_commit: Mutex<Option<CommitSeq>>,
}

impl FileChangeLog {
    /// Open a change log file, creating it if missing and replaying it to
    /// recover the tail otherwise.
    ///
    /// Fails fast on a corrupt or out-of-order file rather than appending
    /// to a log it cannot trust.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut last_commit = None;
        if path.exists() {
            let records = read_records(&path)?;
            for record in &records {
                if let Some(tail) = last_commit {
                    if record.commit_seq < tail {
                        return Err(StorageError::invalid_batch(format!(
                            "change log file {} is out of order: {} after {}",
                            path.display(),
                            record.commit_seq,
                            tail
                        )));
                    }
                }
                last_commit = Some(record.commit_seq);
            }
            if let Some(seq) = last_commit {
                log::debug!(
                    "FileChangeLog: recovered tail {} from {} ({} records)",
                    seq,
                    path.display(),
                    records.len()
                );
            }
        }

        Ok(Self {
            path,
            last_commit: Mutex::new(last_commit),
        })
    }

    /// Append one commit's records; same contract as
    /// [`ChangeLogStore::append`](crate::ChangeLogStore::append).
    pub fn append(&self, records: &[ChangeRecord]) -> Result<CommitSeq> {
        let mut last = self.last_commit.lock().unwrap();
        let commit = validate_append_batch(records, *last)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|e| StorageError::serialization(e.to_string()))?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        *last = Some(commit);

        log::debug!(
            "FileChangeLog: appended {} records at commit {}",
            records.len(),
            commit
        );
        Ok(commit)
    }

    /// Replay the entire file in commit order.
    pub fn read_all(&self) -> Result<Vec<ChangeRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_records(&self.path)
    }

    /// Replay all records from the given commit sequence (inclusive).
    pub fn read_from(&self, start: CommitSeq) -> Result<Vec<ChangeRecord>> {
        let mut records = self.read_all()?;
        records.retain(|r| r.commit_seq >= start);
        Ok(records)
    }

    /// The last appended commit sequence, if any.
    pub fn last_commit(&self) -> Option<CommitSeq> {
        *self.last_commit.lock().unwrap()
    }
}

impl crate::change_log::ChangeLog for FileChangeLog {
    fn append(&self, records: &[ChangeRecord]) -> Result<CommitSeq> {
        FileChangeLog::append(self, records)
    }

    fn read_from(&self, start: CommitSeq) -> Result<Vec<ChangeRecord>> {
        FileChangeLog::read_from(self, start)
    }

    fn read_all(&self) -> Result<Vec<ChangeRecord>> {
        FileChangeLog::read_all(self)
    }

    fn last_commit(&self) -> Option<CommitSeq> {
        FileChangeLog::last_commit(self)
    }
}

fn read_records(path: &Path) -> Result<Vec<ChangeRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ChangeRecord = serde_json::from_str(&line).map_err(|e| {
            StorageError::serialization(format!(
                "corrupt change log line {} in {}: {}",
                number + 1,
                path.display(),
                e
            ))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimlog_commons::{AttributeRow, ChangeType, EntityKey};

    fn record(key: &str, age: i64, change_type: ChangeType, seq: i64) -> ChangeRecord {
        ChangeRecord::new(
            EntityKey::new(key),
            AttributeRow::from_pairs([("age", age)]),
            change_type,
            CommitSeq::new(seq),
        )
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileChangeLog::open(dir.path().join("changes.jsonl")).unwrap();

        log.append(&[record("Afonso", 25, ChangeType::Insert, 10)]).unwrap();
        log.append(&[
            record("Afonso", 25, ChangeType::UpdatePreimage, 20),
            record("Afonso", 26, ChangeType::UpdatePostimage, 20),
        ])
        .unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].change_type, ChangeType::UpdatePreimage);
    }

    #[test]
    fn test_reopen_recovers_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");

        {
            let log = FileChangeLog::open(&path).unwrap();
            log.append(&[record("a", 1, ChangeType::Insert, 10)]).unwrap();
            log.append(&[record("b", 2, ChangeType::Insert, 20)]).unwrap();
        }

        let log = FileChangeLog::open(&path).unwrap();
        assert_eq!(log.last_commit(), Some(CommitSeq::new(20)));
        assert_eq!(log.read_all().unwrap().len(), 2);

        let err = log.append(&[record("c", 3, ChangeType::Insert, 15)]).unwrap_err();
        assert!(matches!(err, StorageError::StaleCommit { .. }));
    }

    #[test]
    fn test_read_from() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileChangeLog::open(dir.path().join("changes.jsonl")).unwrap();
        log.append(&[record("a", 1, ChangeType::Insert, 10)]).unwrap();
        log.append(&[record("b", 2, ChangeType::Insert, 20)]).unwrap();

        let records = log.read_from(CommitSeq::new(20)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, EntityKey::new("b"));
    }

    #[test]
    fn test_corrupt_line_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let err = FileChangeLog::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn test_out_of_order_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");

        let lines = [
            serde_json::to_string(&record("a", 1, ChangeType::Insert, 20)).unwrap(),
            serde_json::to_string(&record("b", 2, ChangeType::Insert, 10)).unwrap(),
        ];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let err = FileChangeLog::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::InvalidBatch(_)));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileChangeLog::open(dir.path().join("changes.jsonl")).unwrap();
        assert!(log.read_all().unwrap().is_empty());
        assert_eq!(log.last_commit(), None);
    }
}
