//! Interval Deriver - turns a change log into SCD2 rows.
//!
//! The per-key sort-and-scan pass: partition the log by key, order each
//! partition by commit sequence (insertion order breaks ties), bound each
//! record's validity interval with the next record's commit, suppress
//! preimages, and rank versions.

use std::collections::BTreeMap;

use dimlog_commons::{ChangeRecord, ChangeType, CommitSeq, DimLogError, EntityKey, Result, Scd2Row};

/// Derive the SCD2 row set from an ordered change log.
///
/// Output has set semantics (no duplicate `(key, attributes, operation,
/// start, end)` tuples) and is ordered by key, then version. Redundant
/// log entries - records identical to one already seen at the same commit
/// point - are collapsed before intervals are computed.
///
/// An empty log derives to an empty row set.
///
/// # Errors
///
/// `NonMonotonicCommitSequence` when a key carries colliding commit
/// sequences that are neither redundant duplicates nor a preimage
/// immediately followed by its postimage.
pub fn derive(log: &[ChangeRecord]) -> Result<Vec<Scd2Row>> {
    if log.is_empty() {
        return Ok(Vec::new());
    }

    // Partition by key; BTreeMap gives deterministic key order in the output.
    let mut partitions: BTreeMap<&EntityKey, Vec<&ChangeRecord>> = BTreeMap::new();
    for record in log {
        partitions.entry(&record.key).or_default().push(record);
    }

    let mut rows = Vec::with_capacity(log.len());
    for (key, mut records) in partitions {
        // Stable sort: log insertion order survives for equal commits.
        records.sort_by_key(|r| r.commit_seq);

        let records = collapse_redundant(records);
        validate_commit_collisions(key, &records)?;

        let mut version = 0u32;
        for (i, record) in records.iter().enumerate() {
            let end = records
                .get(i + 1)
                .map(|next| next.commit_seq)
                .unwrap_or(CommitSeq::OPEN);

            if record.change_type.is_preimage() {
                // Preimages only bound the preceding interval.
                continue;
            }

            version += 1;
            rows.push(Scd2Row {
                key: record.key.clone(),
                attributes: record.attributes.clone(),
                operation: record.change_type,
                version,
                start: record.commit_seq,
                end,
                is_active: end.is_open() && record.change_type != ChangeType::Delete,
            });
        }
    }

    log::debug!("derive: {} records -> {} rows", log.len(), rows.len());
    Ok(rows)
}

/// Drop records identical to one already kept at the same commit point.
fn collapse_redundant<'a>(records: Vec<&'a ChangeRecord>) -> Vec<&'a ChangeRecord> {
    let mut kept: Vec<&ChangeRecord> = Vec::with_capacity(records.len());
    for record in records {
        let redundant = kept
            .iter()
            .rev()
            .take_while(|prev| prev.commit_seq == record.commit_seq)
            .any(|prev| {
                prev.change_type == record.change_type && prev.attributes == record.attributes
            });
        if !redundant {
            kept.push(record);
        }
    }
    kept
}

/// Equal commit sequences within a key are legal only for a preimage
/// immediately followed by its postimage (one merge = one commit point).
fn validate_commit_collisions(key: &EntityKey, records: &[&ChangeRecord]) -> Result<()> {
    let mut i = 0;
    while i < records.len() {
        let mut j = i + 1;
        while j < records.len() && records[j].commit_seq == records[i].commit_seq {
            j += 1;
        }
        let run = &records[i..j];
        let legal_pair = run.len() == 2
            && run[0].change_type == ChangeType::UpdatePreimage
            && run[1].change_type == ChangeType::UpdatePostimage;
        if run.len() > 1 && !legal_pair {
            return Err(DimLogError::non_monotonic(key.clone(), run[0].commit_seq));
        }
        i = j;
    }
    Ok(())
}
