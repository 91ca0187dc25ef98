//! evstar core
//!
//! Shared domain model for the EV star-schema pipeline: cell values, table
//! schemas, the raw extract table, diagnostics, the run report and configuration.
//! Never rename diagnostic codes - they are part of the report format.

pub mod value;
pub mod schema;
pub mod raw;
pub mod diagnostic;
pub mod report;
pub mod config;
pub mod checksum;

pub use value::Value;
pub use schema::{LogicalType, Column, Schema, Nullability, Table, TableError};
pub use raw::{RawRow, RawTable};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use report::{
    RunReport, ReportVersion, ReportSummary, SourceSummary, ImputationSummary, TableSummary,
    DataProfile, NumericProfile, CategoryProfile, ValueCount, QuantileValue,
};
pub use config::{
    Config, ConfigError, SourceConfig, TransformConfig, EmptyColumnPolicy, UnknownCategoryPolicy,
    SinkConfig, PostgresSinkConfig, CsvSinkConfig, ReportConfig,
};
