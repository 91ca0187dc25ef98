//! Delimited extract reading
//!
//! Reads the registration extract into a [`RawTable`]. Every cell is kept as
//! text; typing happens later in the field normalizer.

use evstar_core::checksum::file_sha256_hex;
use evstar_core::{Diagnostic, DiagnosticCode, RawTable, Severity, SourceConfig, SourceSummary};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::jurisdiction::{filter_jurisdiction, STATE_COLUMN};

/// The extract after reading and jurisdiction filtering
#[derive(Debug, Clone)]
pub struct Extract {
    /// Where the rows came from
    pub path: PathBuf,

    /// SHA-256 of the file contents (hex)
    pub sha256: String,

    /// Data rows in the file (header excluded)
    pub rows_read: usize,

    /// `State` value rows were filtered on
    pub jurisdiction: String,

    /// Rows kept by the jurisdiction filter
    pub table: RawTable,
}

impl Extract {
    pub fn rows_retained(&self) -> usize {
        self.table.len()
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.table.len()
    }

    /// Source section of the run report
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            path: self.path.display().to_string(),
            sha256: self.sha256.clone(),
            rows_read: self.rows_read,
            rows_retained: self.rows_retained(),
        }
    }

    /// Info diagnostic for rows outside the jurisdiction, if any were dropped
    pub fn filter_diagnostic(&self) -> Option<Diagnostic> {
        let dropped = self.rows_dropped();
        (dropped > 0).then(|| {
            Diagnostic::new(
                DiagnosticCode::JurisdictionFiltered,
                Severity::Info,
                format!(
                    "Dropped {} of {} rows outside jurisdiction '{}'",
                    dropped, self.rows_read, self.jurisdiction
                ),
            )
            .with_column(STATE_COLUMN)
            .with_count(dropped)
        })
    }
}

/// Errors raised while reading the extract
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read {0}: {1}")]
    IoError(String, String),

    #[error("Malformed delimited data at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("Malformed delimited data: {0}")]
    Csv(String),

    #[error("Extract is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(pos) => ExtractError::Malformed {
                line: pos.line(),
                message: err.to_string(),
            },
            None => ExtractError::Csv(err.to_string()),
        }
    }
}

/// Reads delimited extracts
#[derive(Debug, Clone)]
pub struct Extractor {
    delimiter: u8,
    jurisdiction: String,
}

impl Extractor {
    /// Create an extractor for the given delimiter and jurisdiction
    pub fn new(delimiter: char, jurisdiction: impl Into<String>) -> Result<Self, ExtractError> {
        if !delimiter.is_ascii() {
            return Err(ExtractError::InvalidDelimiter(delimiter));
        }
        Ok(Self {
            delimiter: delimiter as u8,
            jurisdiction: jurisdiction.into(),
        })
    }

    /// Create an extractor from the `[source]` config section
    pub fn from_config(config: &SourceConfig) -> Result<Self, ExtractError> {
        Self::new(config.delimiter, config.jurisdiction.clone())
    }

    /// Read every row of a delimited stream, without filtering
    pub fn read_all<R: Read>(&self, reader: R) -> Result<RawTable, ExtractError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        if !headers.iter().any(|h| h == STATE_COLUMN) {
            return Err(ExtractError::MissingColumn(STATE_COLUMN.to_string()));
        }

        let mut table = RawTable::new(headers);
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line());
            let cells = record.iter().map(|cell| Some(cell.to_string())).collect();

            table.push_row(line, cells).map_err(|e| ExtractError::Malformed {
                line: line.unwrap_or_default(),
                message: e.to_string(),
            })?;
        }

        Ok(table)
    }

    /// Read a delimited stream and keep only the configured jurisdiction
    pub fn extract_reader<R: Read>(&self, reader: R) -> Result<(usize, RawTable), ExtractError> {
        let all = self.read_all(reader)?;
        let rows_read = all.len();
        let table = filter_jurisdiction(all, &self.jurisdiction)?;
        Ok((rows_read, table))
    }

    /// Read and filter the extract at `path`
    pub fn extract_file(&self, path: &Path) -> Result<Extract, ExtractError> {
        let io_err = |e: std::io::Error| ExtractError::IoError(path.display().to_string(), e.to_string());

        let sha256 = file_sha256_hex(path).map_err(io_err)?;
        let file = std::fs::File::open(path).map_err(io_err)?;
        let (rows_read, table) = self.extract_reader(file)?;

        tracing::info!(
            path = %path.display(),
            rows_read,
            rows_retained = table.len(),
            jurisdiction = %self.jurisdiction,
            "extracted source rows"
        );

        Ok(Extract {
            path: path.to_path_buf(),
            sha256,
            rows_read,
            jurisdiction: self.jurisdiction.clone(),
            table,
        })
    }
}
