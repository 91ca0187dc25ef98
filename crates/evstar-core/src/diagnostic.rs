//! Diagnostic codes and run-time findings
//!
//! Codes are stable strings that downstream tooling can match on.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Extraction (1xxx)
    /// Rows dropped by the jurisdiction filter
    JurisdictionFiltered,

    // Transformation (2xxx)
    /// Vehicle location text did not match the point pattern
    GeometryUnresolved,

    /// Numeric value imputed from a group or global median
    ValueImputed,

    /// A numeric column had no observation to impute from
    ImputationNoObservations,

    /// Categorical value outside the known vocabulary
    UnknownCategory,

    // Load (3xxx)
    /// Table written to the sink
    TableLoaded,

    /// Sink rejected a table; later tables were not written
    LoadFailed,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JurisdictionFiltered => "JURISDICTION_FILTERED",
            Self::GeometryUnresolved => "GEOMETRY_UNRESOLVED",
            Self::ValueImputed => "VALUE_IMPUTED",
            Self::ImputationNoObservations => "IMPUTATION_NO_OBSERVATIONS",
            Self::UnknownCategory => "UNKNOWN_CATEGORY",
            Self::TableLoaded => "TABLE_LOADED",
            Self::LoadFailed => "LOAD_FAILED",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - data was accepted but should be reviewed
    Warn,

    /// Error - the run cannot be trusted
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Column the finding relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Number of rows affected
    pub count: usize,

    /// A few offending values, for triage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic affecting a single row
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            column: None,
            count: 1,
            samples: Vec::new(),
        }
    }

    /// Set the column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the affected row count
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set sample values
    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }
}
