//! Table sink trait for replacing warehouse tables

use evstar_core::Table;
use std::fmt;

/// Identifies a table in a load target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentifier {
    /// Schema/namespace name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Fully qualified name with both parts double-quoted for SQL
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// Quote a SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Errors that can occur when loading tables
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Failed to write table {table}: {message}")]
    WriteError { table: String, message: String },

    #[error("IO error on {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LoadError {
    pub fn write(table: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::WriteError {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// The table this error is about, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::WriteError { table, .. } => Some(table),
            _ => None,
        }
    }
}

/// Trait for load targets that replace whole tables
///
/// Each call to `replace_table` is independent: a failure leaves previously
/// replaced tables in place.
#[async_trait::async_trait]
pub trait TableSink: Send + Sync {
    /// Get the sink name (e.g., "PostgreSQL", "CSV")
    fn name(&self) -> &'static str;

    /// Drop the table if it exists, recreate it from `table.schema` and
    /// insert every row
    async fn replace_table(&self, table: &Table) -> Result<(), LoadError>;

    /// Test the connection to the target
    ///
    /// This is useful for validating credentials before transforming.
    async fn test_connection(&self) -> Result<(), LoadError>;
}
