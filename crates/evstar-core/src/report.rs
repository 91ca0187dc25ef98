//! Run report schema (stable v1)
//!
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 1 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What was read from the extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Path of the extract
    pub path: String,

    /// SHA-256 of the file contents (hex)
    pub sha256: String,

    /// Data rows in the file
    pub rows_read: usize,

    /// Rows kept by the jurisdiction filter
    pub rows_retained: usize,
}

/// Per-column imputation counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationSummary {
    /// Column name
    pub column: String,

    /// Literal zeros turned into nulls
    pub zeros_replaced: usize,

    /// Nulls before imputation (zeros included)
    pub missing: usize,

    /// Filled from the (make, model) median
    pub filled_by_make_model: usize,

    /// Filled from the make median
    pub filled_by_make: usize,

    /// Filled from the global median
    pub filled_by_global: usize,

    /// Still null afterwards
    pub remaining: usize,
}

impl ImputationSummary {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ..Self::default()
        }
    }

    /// Total number of values filled at any level
    pub fn filled(&self) -> usize {
        self.filled_by_make_model + self.filled_by_make + self.filled_by_global
    }
}

/// `describe()`-style statistics of a float column, nulls excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericProfile {
    /// Column name
    pub column: String,

    /// Non-null values
    pub count: usize,

    pub mean: Option<f64>,

    /// Sample standard deviation, `None` below two values
    pub std: Option<f64>,

    pub min: Option<f64>,

    pub p25: Option<f64>,

    pub p50: Option<f64>,

    pub p75: Option<f64>,

    pub max: Option<f64>,
}

/// One quantile of an integer column, truncated toward zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: i64,
}

/// Occurrences of one categorical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Value counts of a categorical column, nulls excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    /// Column name
    pub column: String,

    pub counts: Vec<ValueCount>,
}

/// Shape and distributions of the normalized extract, before imputation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataProfile {
    /// Rows after the jurisdiction filter
    pub rows: usize,

    /// Columns in the extract
    pub columns: usize,

    /// `electric_range` and `base_msrp`
    #[serde(default)]
    pub numeric: Vec<NumericProfile>,

    /// `model_year` at 0, .1, .25, .5, .75, .9 and 1
    #[serde(default)]
    pub model_year: Vec<QuantileValue>,

    /// `ev_type` by descending count, `cafv_eligibility` by value
    #[serde(default)]
    pub categories: Vec<CategoryProfile>,
}

/// Row count of one produced table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Table name
    pub name: String,

    /// Rows produced
    pub rows: usize,

    /// Whether the table was written to the sink
    pub loaded: bool,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,
}

/// Run report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Extract details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSummary>,

    /// Extract profile taken before imputation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<DataProfile>,

    /// Imputation counts per treated column
    #[serde(default)]
    pub imputation: Vec<ImputationSummary>,

    /// Produced tables
    #[serde(default)]
    pub tables: Vec<TableSummary>,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: None,
            profile: None,
            imputation: Vec::new(),
            tables: Vec::new(),
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.summary.total += 1;
        self.diagnostics.push(diagnostic);
    }

    /// Record a produced table
    pub fn add_table(&mut self, name: impl Into<String>, rows: usize) {
        self.tables.push(TableSummary {
            name: name.into(),
            rows,
            loaded: false,
        });
    }

    /// Mark a table as written to the sink
    pub fn mark_loaded(&mut self, name: &str) {
        if let Some(table) = self.tables.iter_mut().find(|t| t.name == name) {
            table.loaded = true;
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
