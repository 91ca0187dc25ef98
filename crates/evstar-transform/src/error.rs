//! Transformation errors

use evstar_core::TableError;
use std::fmt;

/// Points at an offending row: the source line when known, else the row index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    /// 0-based position in the filtered table
    pub index: usize,

    /// 1-indexed line in the source file
    pub line: Option<u64>,
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}", line),
            None => write!(f, "row {}", self.index + 1),
        }
    }
}

/// Fatal transformation failures. Any of these aborts the run before loading.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Extract is missing source column '{0}'")]
    MissingColumn(String),

    #[error("Invalid number '{value}' in column '{column}' at {row}")]
    InvalidNumber {
        column: String,
        value: String,
        row: RowRef,
    },

    #[error("Missing required value in column '{column}' at {row}")]
    MissingValue { column: String, row: RowRef },

    #[error("Column '{0}' has no observations to impute from")]
    NoObservations(String),

    #[error("Unknown {column} value '{value}' at {row}")]
    UnknownCategory {
        column: String,
        value: String,
        row: RowRef,
    },

    #[error("Row {row} has no match in dimension '{dimension}'")]
    UnresolvedForeignKey { dimension: String, row: usize },

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error(transparent)]
    Table(#[from] TableError),
}
