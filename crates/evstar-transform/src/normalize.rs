//! Field normalizer
//!
//! Maps source headers onto canonical snake_case fields and enforces types:
//! `electric_range` and `base_msrp` become floats, `model_year` an integer.
//! Any non-numeric value in those columns aborts the run; there is no
//! skip-row policy.

use evstar_core::{RawRow, RawTable};

use crate::error::{RowRef, TransformError};
use crate::record::{Field, VehicleRecord, SOURCE_FIELDS};

/// Resolved position of every source field in the extract header
struct ColumnMap {
    positions: [usize; SOURCE_FIELDS.len()],
}

impl ColumnMap {
    fn resolve(raw: &RawTable) -> Result<Self, TransformError> {
        let mut positions = [0usize; SOURCE_FIELDS.len()];
        for (slot, field) in positions.iter_mut().zip(SOURCE_FIELDS.iter()) {
            let header = field.source_header().unwrap_or_else(|| field.name());
            *slot = raw
                .column_index(header)
                .ok_or_else(|| TransformError::MissingColumn(header.to_string()))?;
        }
        Ok(Self { positions })
    }

    fn cell<'a>(&self, row: &'a RawRow, field: Field) -> Option<&'a str> {
        let slot = SOURCE_FIELDS.iter().position(|f| *f == field)?;
        row.get(self.positions[slot])
    }
}

/// Normalize the jurisdiction-filtered extract into typed records
pub fn normalize(raw: &RawTable) -> Result<Vec<VehicleRecord>, TransformError> {
    let columns = ColumnMap::resolve(raw)?;

    let records = raw
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_row(&columns, row, RowRef { index, line: row.line }))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(rows = records.len(), "normalized fields");
    Ok(records)
}

fn normalize_row(columns: &ColumnMap, row: &RawRow, at: RowRef) -> Result<VehicleRecord, TransformError> {
    let text = |field: Field| columns.cell(row, field).map(str::to_string);

    let model_year = match columns.cell(row, Field::ModelYear) {
        Some(value) => parse_int(Field::ModelYear, value, at)?,
        None => {
            return Err(TransformError::MissingValue {
                column: Field::ModelYear.name().to_string(),
                row: at,
            })
        }
    };

    Ok(VehicleRecord {
        line: row.line,
        vin: text(Field::Vin),
        ev_type: text(Field::EvType),
        cafv_eligibility: text(Field::CafvEligibility),
        electric_range: parse_float(Field::ElectricRange, columns.cell(row, Field::ElectricRange), at)?,
        base_msrp: parse_float(Field::BaseMsrp, columns.cell(row, Field::BaseMsrp), at)?,
        model_year,
        make: text(Field::Make),
        model: text(Field::Model),
        state: text(Field::State),
        county: text(Field::County),
        city: text(Field::City),
        postal_code: text(Field::PostalCode),
        legislative_district: text(Field::LegislativeDistrict),
        dol_vehicle_id: text(Field::DolVehicleId),
        vehicle_location: text(Field::VehicleLocation),
        electric_utility: text(Field::ElectricUtility),
        census_tract: text(Field::CensusTract),
        latitude: None,
        longitude: None,
    })
}

/// Parse an optional float; blank and NaN are missing
fn parse_float(field: Field, value: Option<&str>, at: RowRef) -> Result<Option<f64>, TransformError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let parsed: f64 = value.parse().map_err(|_| TransformError::InvalidNumber {
        column: field.name().to_string(),
        value: value.to_string(),
        row: at,
    })?;

    Ok(if parsed.is_nan() { None } else { Some(parsed) })
}

fn parse_int(field: Field, value: &str, at: RowRef) -> Result<i64, TransformError> {
    value.trim().parse().map_err(|_| TransformError::InvalidNumber {
        column: field.name().to_string(),
        value: value.to_string(),
        row: at,
    })
}
