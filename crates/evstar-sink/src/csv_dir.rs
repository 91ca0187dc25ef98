//! CSV directory sink
//!
//! Writes each table to `<directory>/<table>.csv` with a header row.
//! Replacing a table overwrites its file. Nulls are written as empty cells.

use crate::adapter::{LoadError, TableSink};
use evstar_core::{CsvSinkConfig, Table};
use std::path::{Path, PathBuf};

pub struct CsvDirectorySink {
    directory: PathBuf,
}

impl CsvDirectorySink {
    /// Create the sink, creating the directory if missing
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|e| LoadError::IoError {
            path: directory.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { directory })
    }

    pub fn from_config(config: &CsvSinkConfig) -> Result<Self, LoadError> {
        Self::create(&config.directory)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Output file for a table
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", table))
    }

    fn write(&self, table: &Table, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(table.schema.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TableSink for CsvDirectorySink {
    fn name(&self) -> &'static str {
        "CSV"
    }

    async fn replace_table(&self, table: &Table) -> Result<(), LoadError> {
        let path = self.path_for(&table.name);
        self.write(table, &path)
            .map_err(|e| LoadError::write(&table.name, format!("{}: {}", path.display(), e)))?;

        tracing::info!(table = %table.name, rows = table.row_count(), path = %path.display(), "wrote table");
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), LoadError> {
        if self.directory.is_dir() {
            Ok(())
        } else {
            Err(LoadError::IoError {
                path: self.directory.display().to_string(),
                message: "not a directory".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evstar_core::{Column, LogicalType, Schema, Value};

    fn utility_table(rows: &[Option<&str>]) -> Table {
        let mut table = Table::new(
            "dim_utility",
            Schema::from_columns(vec![
                Column::new("electric_utility", LogicalType::String),
                Column::new("utility_id", LogicalType::Int),
            ]),
        );
        for (i, utility) in rows.iter().enumerate() {
            table
                .push_row(vec![Value::text(*utility), Value::Int(i as i64 + 1)])
                .unwrap();
        }
        table
    }

    #[tokio::test]
    async fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvDirectorySink::create(dir.path().join("out")).unwrap();

        sink.replace_table(&utility_table(&[Some("PUGET SOUND ENERGY INC"), None]))
            .await
            .unwrap();

        let written = std::fs::read_to_string(sink.path_for("dim_utility")).unwrap();
        assert_eq!(written, "electric_utility,utility_id\nPUGET SOUND ENERGY INC,1\n,2\n");
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvDirectorySink::create(dir.path()).unwrap();

        sink.replace_table(&utility_table(&[Some("A"), Some("B"), Some("C")]))
            .await
            .unwrap();
        sink.replace_table(&utility_table(&[Some("D")])).await.unwrap();

        let written = std::fs::read_to_string(sink.path_for("dim_utility")).unwrap();
        assert_eq!(written, "electric_utility,utility_id\nD,1\n");
    }

    #[tokio::test]
    async fn test_connection_checks_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvDirectorySink::create(dir.path()).unwrap();
        assert!(sink.test_connection().await.is_ok());

        std::fs::remove_dir(dir.path()).unwrap();
        assert!(matches!(sink.test_connection().await, Err(LoadError::IoError { .. })));
    }
}
