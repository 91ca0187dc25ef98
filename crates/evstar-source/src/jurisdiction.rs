//! Jurisdiction filter applied before normalization

use evstar_core::RawTable;

use crate::extract::ExtractError;

/// Source header holding the registration state
pub const STATE_COLUMN: &str = "State";

/// Keep only rows whose `State` cell equals `jurisdiction` exactly
pub fn filter_jurisdiction(mut table: RawTable, jurisdiction: &str) -> Result<RawTable, ExtractError> {
    let state = table
        .column_index(STATE_COLUMN)
        .ok_or_else(|| ExtractError::MissingColumn(STATE_COLUMN.to_string()))?;

    let before = table.len();
    table.retain(|row| row.get(state) == Some(jurisdiction));
    tracing::debug!(jurisdiction, kept = table.len(), dropped = before - table.len(), "jurisdiction filter");

    Ok(table)
}
