//! Configuration schema (evstar.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the extract comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the delimited extract
    #[serde(default = "default_source_path")]
    pub path: PathBuf,

    /// Field delimiter (single byte)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Only rows whose `State` cell equals this are kept
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,
}

fn default_source_path() -> PathBuf {
    PathBuf::from("Electric_Vehicle_Population_Data.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_jurisdiction() -> String {
    "WA".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            delimiter: default_delimiter(),
            jurisdiction: default_jurisdiction(),
        }
    }
}

/// What to do when a numeric column has no observation at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyColumnPolicy {
    /// Abort the run
    #[default]
    Fail,

    /// Fill with 0.0
    Zero,

    /// Leave the nulls in place
    KeepNull,
}

/// What to do with a categorical value outside the known vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Carry the original text through and warn
    #[default]
    PassThrough,

    /// Abort the run
    Reject,
}

/// Transformation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub on_empty_column: EmptyColumnPolicy,

    #[serde(default)]
    pub on_unknown_category: UnknownCategoryPolicy,
}

/// PostgreSQL connection target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresSinkConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub database: String,

    pub user: String,

    /// Inline password; prefer `password_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Target schema for the six tables
    #[serde(default = "default_pg_schema")]
    pub schema: String,

    /// Connect over TLS
    #[serde(default)]
    pub tls: bool,

    /// Rows per INSERT statement
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_pg_schema() -> String {
    "public".to_string()
}

fn default_batch_size() -> usize {
    1000
}

impl PostgresSinkConfig {
    /// Resolve the password from the inline value or the named environment variable
    pub fn resolve_password(&self) -> Result<String, ConfigError> {
        if let Some(var) = &self.password_env {
            return std::env::var(var).map_err(|_| ConfigError::MissingSecret(var.clone()));
        }
        Ok(self.password.clone().unwrap_or_default())
    }
}

/// CSV directory target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvSinkConfig {
    /// Output directory, created if missing
    pub directory: PathBuf,
}

/// Load target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    /// PostgreSQL database
    Postgres(PostgresSinkConfig),

    /// One CSV file per table
    Csv(CsvSinkConfig),
}

impl SinkConfig {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Csv(_) => "csv",
        }
    }
}

/// Run report output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_path")]
    pub path: PathBuf,
}

fn default_report_path() -> PathBuf {
    PathBuf::from("evstar-report.json")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub transform: TransformConfig,

    /// Load target; required by `run`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<SinkConfig>,

    #[serde(default)]
    pub report: ReportConfig,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            transform: TransformConfig::default(),
            sink: None,
            report: ReportConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Relative paths in the file are relative to the file itself
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if !config.source.delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue(format!(
                "delimiter must be a single ASCII character, got '{}'",
                config.source.delimiter
            )));
        }
        if let Some(SinkConfig::Postgres(pg)) = &config.sink {
            if pg.batch_size == 0 {
                return Err(ConfigError::InvalidValue("batch_size must be at least 1".to_string()));
            }
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.project_root.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Environment variable '{0}' is not set")]
    MissingSecret(String),
}
