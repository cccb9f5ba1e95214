//! Merge Engine - applies a source batch against the current dimension
//! state and emits the resulting change records.
//!
//! Upsert semantics: matched rows with changed attributes emit a
//! preimage/postimage pair, unmatched source rows emit an insert, and
//! target keys absent from the source are left untouched. Merge never
//! emits deletes.

use std::collections::HashSet;

use dimlog_commons::{
    ChangeRecord, ChangeType, CommitSeq, DimLogError, DimensionState, Result, SourceRow,
};

/// Compute the change records a source batch produces against `current`.
///
/// All emitted records carry `commit` (one merge = one commit point); a
/// preimage is ordered immediately before its postimage, and records for
/// independent keys follow source batch order. A batch that matches the
/// current state exactly emits nothing.
///
/// # Errors
///
/// `DuplicateKeyInBatch` if the source batch repeats a key; no records
/// are emitted (the target state would be ambiguous otherwise).
pub fn merge(
    current: &DimensionState,
    source: &[SourceRow],
    commit: CommitSeq,
) -> Result<Vec<ChangeRecord>> {
    // Validate the whole batch before emitting anything.
    let mut seen = HashSet::with_capacity(source.len());
    for row in source {
        if !seen.insert(&row.key) {
            return Err(DimLogError::duplicate_key(row.key.clone()));
        }
    }

    let mut records = Vec::new();
    for row in source {
        match current.get(&row.key) {
            Some(existing) if existing == &row.attributes => {
                // No-op match: nothing to emit.
            }
            Some(existing) => {
                records.push(ChangeRecord::new(
                    row.key.clone(),
                    existing.clone(),
                    ChangeType::UpdatePreimage,
                    commit,
                ));
                records.push(ChangeRecord::new(
                    row.key.clone(),
                    row.attributes.clone(),
                    ChangeType::UpdatePostimage,
                    commit,
                ));
            }
            None => {
                records.push(ChangeRecord::new(
                    row.key.clone(),
                    row.attributes.clone(),
                    ChangeType::Insert,
                    commit,
                ));
            }
        }
    }

    log::debug!(
        "merge: {} source rows against {} current entities -> {} records at {}",
        source.len(),
        current.len(),
        records.len(),
        commit
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimlog_commons::{AttributeRow, EntityKey};

    fn attrs(age: i64) -> AttributeRow {
        AttributeRow::from_pairs([("age", age)])
    }

    fn state(entries: &[(&str, i64)]) -> DimensionState {
        entries
            .iter()
            .map(|(k, age)| (EntityKey::new(*k), attrs(*age)))
            .collect()
    }

    #[test]
    fn test_matched_changed_row_emits_update_pair() {
        let records = merge(
            &state(&[("Afonso", 25)]),
            &[SourceRow::new("Afonso", attrs(26))],
            CommitSeq::new(2),
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].change_type, ChangeType::UpdatePreimage);
        assert_eq!(records[0].attributes, attrs(25));
        assert_eq!(records[1].change_type, ChangeType::UpdatePostimage);
        assert_eq!(records[1].attributes, attrs(26));
        assert_eq!(records[0].commit_seq, records[1].commit_seq);
    }

    #[test]
    fn test_matched_equal_row_emits_nothing() {
        let records = merge(
            &state(&[("Afonso", 25)]),
            &[SourceRow::new("Afonso", attrs(25))],
            CommitSeq::new(2),
        )
        .unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_unmatched_source_row_emits_insert() {
        let records = merge(
            &DimensionState::new(),
            &[SourceRow::new("Sandra", attrs(20))],
            CommitSeq::new(3),
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].change_type, ChangeType::Insert);
        assert_eq!(records[0].key, EntityKey::new("Sandra"));
    }

    #[test]
    fn test_unmatched_target_rows_are_untouched() {
        // Target keys absent from the source never produce deletes.
        let records = merge(
            &state(&[("Afonso", 25), ("Maria", 30)]),
            &[SourceRow::new("Afonso", attrs(26))],
            CommitSeq::new(2),
        )
        .unwrap();

        assert!(records.iter().all(|r| r.key != EntityKey::new("Maria")));
        assert!(records.iter().all(|r| r.change_type != ChangeType::Delete));
    }

    #[test]
    fn test_records_follow_source_order() {
        let records = merge(
            &state(&[("Daniel", 25), ("Maria", 25)]),
            &[
                SourceRow::new("Daniel", attrs(26)),
                SourceRow::new("Maria", attrs(30)),
                SourceRow::new("Sandra", attrs(20)),
            ],
            CommitSeq::new(4),
        )
        .unwrap();

        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Daniel", "Daniel", "Maria", "Maria", "Sandra"]);
        assert!(records.iter().all(|r| r.commit_seq == CommitSeq::new(4)));
    }

    #[test]
    fn test_duplicate_key_rejects_whole_batch() {
        let err = merge(
            &DimensionState::new(),
            &[
                SourceRow::new("Afonso", attrs(25)),
                SourceRow::new("Afonso", attrs(26)),
            ],
            CommitSeq::new(2),
        )
        .unwrap_err();

        assert!(matches!(err, DimLogError::DuplicateKeyInBatch { .. }));
    }

    #[test]
    fn test_empty_source_is_not_an_error() {
        let records = merge(&state(&[("a", 1)]), &[], CommitSeq::new(2)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_merge_identical_to_current_is_idempotent() {
        let current = state(&[("a", 1), ("b", 2), ("c", 3)]);
        let source: Vec<SourceRow> = current
            .iter()
            .map(|(k, v)| SourceRow::new(k.clone(), v.clone()))
            .collect();

        let records = merge(&current, &source, CommitSeq::new(9)).unwrap();
        assert!(records.is_empty());
    }
}
