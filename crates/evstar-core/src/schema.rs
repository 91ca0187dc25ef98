//! Schema types and the generic output table

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Portable logical type system
///
/// Sinks map these onto their own column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    /// Integer type (64-bit)
    Int,

    /// Floating point (double precision)
    Float,

    /// String/text type
    String,
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::String => write!(f, "STRING"),
        }
    }
}

impl LogicalType {
    /// Check whether a value can be stored in a column of this type
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::String, Value::Text(_))
        )
    }
}

/// Nullability state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    /// Column may hold nulls
    Yes,

    /// Column never holds nulls
    No,
}

/// A column in a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Logical type
    pub logical_type: LogicalType,

    /// Nullability
    pub nullable: Nullability,
}

impl Column {
    /// Create a new nullable column
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable: Nullability::Yes,
        }
    }

    /// Set nullability
    pub fn with_nullability(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }
}

/// An ordered collection of columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of columns
    pub columns: Vec<Column>,
}

impl Schema {
    /// Create a schema from columns
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Errors raised while building a [`Table`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Row {row} in table '{table}' has {actual} values, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{column}' in table '{table}' is {expected} but row {row} holds {value:?}")]
    TypeMismatch {
        table: String,
        column: String,
        row: usize,
        expected: LogicalType,
        value: Value,
    },

    #[error("Column '{column}' in table '{table}' is NOT NULL but row {row} is null")]
    NullViolation {
        table: String,
        column: String,
        row: usize,
    },
}

/// A named, typed, row-oriented table handed to a sink
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Target table name
    pub name: String,

    /// Column definitions
    pub schema: Schema,

    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row, checking width, types and nullability against the schema
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        let index = self.rows.len();
        if row.len() != self.schema.len() {
            return Err(TableError::RowWidth {
                table: self.name.clone(),
                row: index,
                expected: self.schema.len(),
                actual: row.len(),
            });
        }

        for (column, value) in self.schema.columns.iter().zip(&row) {
            if value.is_null() && column.nullable == Nullability::No {
                return Err(TableError::NullViolation {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    row: index,
                });
            }
            if !column.logical_type.accepts(value) {
                return Err(TableError::TypeMismatch {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    row: index,
                    expected: column.logical_type,
                    value: value.clone(),
                });
            }
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the values of one column, or `None` if the column does not exist
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let index = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }
}
