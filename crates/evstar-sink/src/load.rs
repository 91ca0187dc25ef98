//! Load sequencing and sink construction

use crate::adapter::{LoadError, TableSink};
use crate::csv_dir::CsvDirectorySink;
use crate::postgres::PostgresSink;
use evstar_core::{SinkConfig, Table};

/// Outcome of loading a sequence of tables
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Tables replaced, in order, with their row counts
    pub loaded: Vec<(String, usize)>,

    /// The error that stopped the sequence, if any
    pub error: Option<LoadError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<(String, usize)>, LoadError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.loaded),
        }
    }
}

/// Replace each table in order, stopping at the first failure
///
/// Tables replaced before the failure stay replaced; later tables are not
/// touched. Errors are rewritten to name the failing table.
pub async fn load_tables(sink: &dyn TableSink, tables: &[Table]) -> LoadReport {
    let mut loaded = Vec::with_capacity(tables.len());

    for table in tables {
        tracing::debug!(sink = sink.name(), table = %table.name, rows = table.row_count(), "replacing table");

        if let Err(error) = sink.replace_table(table).await {
            let error = match error {
                LoadError::WriteError { .. } => error,
                other => LoadError::write(&table.name, other),
            };
            tracing::error!(sink = sink.name(), table = %table.name, error = %error, "load stopped");
            return LoadReport {
                loaded,
                error: Some(error),
            };
        }

        loaded.push((table.name.clone(), table.row_count()));
    }

    tracing::info!(sink = sink.name(), tables = loaded.len(), "load complete");
    LoadReport { loaded, error: None }
}

/// Build the sink named by the config
pub async fn connect_sink(config: &SinkConfig) -> Result<Box<dyn TableSink>, LoadError> {
    let sink: Box<dyn TableSink> = match config {
        SinkConfig::Postgres(pg) => Box::new(PostgresSink::connect(pg).await?),
        SinkConfig::Csv(csv) => Box::new(CsvDirectorySink::from_config(csv)?),
    };
    sink.test_connection().await?;
    Ok(sink)
}
