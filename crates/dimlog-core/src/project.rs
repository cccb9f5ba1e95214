//! Dimension Projector - extracts the current state from derived rows.

use dimlog_commons::{DimLogError, DimensionState, Result, Scd2Row};

/// Project the active subset of an SCD2 row set into the current
/// dimension state.
///
/// # Errors
///
/// `MultipleActiveRowsForKey` if more than one row for the same key is
/// active. That can only come from a malformed log (for example commit
/// sequence reuse across commits) and must surface rather than be
/// resolved by silently picking one row.
pub fn project(rows: &[Scd2Row]) -> Result<DimensionState> {
    let mut state = DimensionState::new();
    for row in rows.iter().filter(|r| r.is_active) {
        if state
            .insert(row.key.clone(), row.attributes.clone())
            .is_some()
        {
            return Err(DimLogError::multiple_active(row.key.clone()));
        }
    }
    Ok(state)
}
