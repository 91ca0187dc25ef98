//! Extraction boundary
//!
//! This crate handles:
//! - Reading the delimited registration extract as text
//! - Filtering rows to one jurisdiction
//! - Recording provenance (row counts, file checksum)

pub mod extract;
pub mod jurisdiction;

pub use extract::{Extract, ExtractError, Extractor};
pub use jurisdiction::{filter_jurisdiction, STATE_COLUMN};
