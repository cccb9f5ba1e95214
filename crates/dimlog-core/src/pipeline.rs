//! Dimension pipeline - the batch round trip over the collaborator stores.
//!
//! Each invocation: read current dimension state, merge the source batch,
//! append the emitted records to the change log, re-derive the SCD2 rows
//! from the full log, project the active subset, and write it back to the
//! dimension store.
//!
//! The pipeline assumes exclusive access to its stores for the duration
//! of one invocation; serializing concurrent writers over the same key
//! range is the caller's responsibility.

use std::sync::Arc;

use dimlog_commons::{
    ChangeRecord, ChangeType, CommitSeq, CommitSeqGenerator, DimensionState, EntityKey, Result,
    Scd2Row, SourceRow,
};
use dimlog_store::{ChangeLog, ChangeLogStore, DimensionStore, StorageBackend};

use crate::{derive, merge, project};

/// Result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Commit point of the appended records, or None if nothing was emitted
    pub commit: Option<CommitSeq>,
    /// Number of change records appended to the log
    pub records_appended: usize,
    /// Size of the derived SCD2 row set after this invocation
    pub rows_derived: usize,
}

/// Batch pipeline tying the engines to a change log and a dimension store.
pub struct DimensionPipeline {
    log: Box<dyn ChangeLog>,
    dimension: DimensionStore,
    sequencer: CommitSeqGenerator,
}

impl DimensionPipeline {
    /// Build a pipeline over a shared storage backend, with the change log
    /// and dimension on their default partitions.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Result<Self> {
        let log = ChangeLogStore::new(backend.clone())?;
        let dimension = DimensionStore::new(backend);
        Ok(Self::with_parts(log, dimension, CommitSeqGenerator::default()))
    }

    /// Build a pipeline from explicit parts. Any [`ChangeLog`]
    /// implementation works, including a file-backed one.
    pub fn with_parts(
        log: impl ChangeLog + 'static,
        dimension: DimensionStore,
        sequencer: CommitSeqGenerator,
    ) -> Self {
        Self {
            log: Box::new(log),
            dimension,
            sequencer,
        }
    }

    /// Merge a source batch into the dimension.
    ///
    /// A batch that matches the current state exactly appends nothing and
    /// leaves both stores unchanged.
    pub fn apply_batch(&self, source: &[SourceRow]) -> Result<BatchOutcome> {
        let current = self.dimension.load_state()?;
        let commit = self.sequencer.next_seq()?;
        let records = merge(&current, source, commit)?;

        if records.is_empty() {
            log::debug!("DimensionPipeline: batch matched current state, nothing to apply");
            return Ok(BatchOutcome {
                commit: None,
                records_appended: 0,
                rows_derived: 0,
            });
        }

        self.commit_records(records)
    }

    /// Retire entities: append explicit delete records for the given keys.
    ///
    /// Merge itself never deletes unmatched target rows; this is the
    /// separate, explicit path for removing entities. Keys not present in
    /// the current state are skipped. The deleted entities drop out of the
    /// projected state while their history stays derivable from the log.
    pub fn retire(&self, keys: &[EntityKey]) -> Result<BatchOutcome> {
        let current = self.dimension.load_state()?;
        let commit = self.sequencer.next_seq()?;

        let records: Vec<ChangeRecord> = keys
            .iter()
            .filter_map(|key| {
                current.get(key).map(|attributes| {
                    ChangeRecord::new(key.clone(), attributes.clone(), ChangeType::Delete, commit)
                })
            })
            .collect();

        if records.is_empty() {
            log::debug!("DimensionPipeline: no current entities among {} retire keys", keys.len());
            return Ok(BatchOutcome {
                commit: None,
                records_appended: 0,
                rows_derived: 0,
            });
        }

        self.commit_records(records)
    }

    /// The full derived SCD2 history.
    pub fn history(&self) -> Result<Vec<Scd2Row>> {
        let records = self.log.read_all()?;
        derive(&records)
    }

    /// Rebuild the dimension store from the change log.
    ///
    /// The dimension is a materialized view, recomputable from the log at
    /// any time. After attaching the pipeline to an existing log (for
    /// example a file log written by a previous process) this recomputes
    /// the active state and writes it back. Returns the rebuilt state.
    pub fn rehydrate(&self) -> Result<DimensionState> {
        let rows = derive(&self.log.read_all()?)?;
        let state = project(&rows)?;
        self.dimension.replace_state(&state)?;
        log::debug!("DimensionPipeline: rehydrated {} active entities", state.len());
        Ok(state)
    }

    /// The current projected dimension state.
    pub fn current(&self) -> Result<DimensionState> {
        Ok(self.dimension.load_state()?)
    }

    /// The last committed sequence in the change log, if any.
    pub fn last_commit(&self) -> Option<CommitSeq> {
        self.log.last_commit()
    }

    /// Append records, re-derive, project, and write the state back.
    fn commit_records(&self, records: Vec<ChangeRecord>) -> Result<BatchOutcome> {
        let commit = self.log.append(&records)?;
        let full_log = self.log.read_all()?;
        let rows = derive(&full_log)?;
        let state = project(&rows)?;
        self.dimension.replace_state(&state)?;

        log::debug!(
            "DimensionPipeline: commit {} applied, {} records, {} derived rows, {} active entities",
            commit,
            records.len(),
            rows.len(),
            state.len()
        );
        Ok(BatchOutcome {
            commit: Some(commit),
            records_appended: records.len(),
            rows_derived: rows.len(),
        })
    }
}
