//! Untyped extract table, as read from the delimited source file

use crate::schema::TableError;

/// One row of the raw extract
///
/// Cells line up with [`RawTable::headers`]. Empty cells are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-indexed line in the source file, when known
    pub line: Option<u64>,

    /// Cell values in header order
    pub cells: Vec<Option<String>>,
}

/// The extract as a header plus text rows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table with the given source headers
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row. Empty strings become `None`.
    pub fn push_row(&mut self, line: Option<u64>, cells: Vec<Option<String>>) -> Result<(), TableError> {
        if cells.len() != self.headers.len() {
            return Err(TableError::RowWidth {
                table: "raw".to_string(),
                row: self.rows.len(),
                expected: self.headers.len(),
                actual: cells.len(),
            });
        }

        let cells = cells
            .into_iter()
            .map(|cell| cell.filter(|v| !v.is_empty()))
            .collect();
        self.rows.push(RawRow { line, cells });
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a source header
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Keep only the rows for which `predicate` holds
    pub fn retain(&mut self, mut predicate: impl FnMut(&RawRow) -> bool) {
        self.rows.retain(|row| predicate(row));
    }
}

impl RawRow {
    /// Cell at `index`, `None` when empty or out of range
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}
