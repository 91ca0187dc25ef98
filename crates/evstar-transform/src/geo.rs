//! Geo extractor
//!
//! Splits `vehicle_location` (`POINT (<x> <y>)`) into two float columns.
//!
//! NOTE: the first token is written to `latitude` and the second to
//! `longitude`. In WKT the first token is x (longitude) and the second is y
//! (latitude), so for `POINT (-122.3 47.6)` this yields `latitude = -122.3`.
//! Downstream consumers of `dim_location` rely on this layout; swap the
//! assignment in [`GeoExtractor::parse`] only together with them.

use evstar_core::{Diagnostic, DiagnosticCode, Severity};
use regex::Regex;

use crate::error::TransformError;
use crate::record::{Field, VehicleRecord};

/// Stand-in for an absent location; never matches the point pattern
pub const EMPTY_POINT: &str = "POINT EMPTY";

const POINT_PATTERN: &str = r"POINT \(([-\d\.]+) ([-\d\.]+)\)";

const MAX_SAMPLES: usize = 5;

/// Output of the geo stage
#[derive(Debug, Clone)]
pub struct GeoOutcome {
    /// Input records with `latitude`/`longitude` set
    pub records: Vec<VehicleRecord>,

    /// Rows whose location did not resolve (including absent locations)
    pub unresolved: usize,

    /// Informational diagnostic when any row did not resolve
    pub diagnostic: Option<Diagnostic>,
}

/// Parses point geometry text
#[derive(Debug, Clone)]
pub struct GeoExtractor {
    pattern: Regex,
}

impl GeoExtractor {
    pub fn new() -> Result<Self, TransformError> {
        let pattern = Regex::new(POINT_PATTERN).map_err(|e| TransformError::Pattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// Extract `(latitude, longitude)` in source token order
    ///
    /// Returns `None` for absent text, the empty-point sentinel, text that does
    /// not contain the pattern, and tokens that are not valid floats (`1.2.3`).
    pub fn parse(&self, location: Option<&str>) -> Option<(f64, f64)> {
        let text = location.unwrap_or(EMPTY_POINT);
        let captures = self.pattern.captures(text)?;
        let first: f64 = captures.get(1)?.as_str().parse().ok()?;
        let second: f64 = captures.get(2)?.as_str().parse().ok()?;
        Some((first, second))
    }

    /// Derive latitude/longitude for every record
    pub fn apply(&self, records: &[VehicleRecord]) -> GeoOutcome {
        let mut unresolved = 0;
        let mut samples = Vec::new();

        let records: Vec<VehicleRecord> = records
            .iter()
            .map(|record| {
                let mut out = record.clone();
                match self.parse(record.vehicle_location.as_deref()) {
                    Some((latitude, longitude)) => {
                        out.latitude = Some(latitude);
                        out.longitude = Some(longitude);
                    }
                    None => {
                        unresolved += 1;
                        out.latitude = None;
                        out.longitude = None;
                        if samples.len() < MAX_SAMPLES {
                            let text = record.vehicle_location.as_deref().unwrap_or(EMPTY_POINT);
                            if !samples.iter().any(|s| s == text) {
                                samples.push(text.to_string());
                            }
                        }
                    }
                }
                out
            })
            .collect();

        let diagnostic = (unresolved > 0).then(|| {
            Diagnostic::new(
                DiagnosticCode::GeometryUnresolved,
                Severity::Info,
                format!("{} rows have no usable vehicle location; latitude/longitude left null", unresolved),
            )
            .with_column(Field::VehicleLocation.name())
            .with_count(unresolved)
            .with_samples(samples)
        });

        tracing::info!(rows = records.len(), unresolved, "extracted coordinates");
        GeoOutcome {
            records,
            unresolved,
            diagnostic,
        }
    }
}
