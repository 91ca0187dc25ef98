//! Dimensionalizer
//!
//! Builds the five dimension tables from the encoded records and joins their
//! surrogate keys back onto every record. Keys are 1-based and follow the
//! first occurrence of each distinct combination of defining columns; they
//! are only meaningful within a single run.

use evstar_core::{Column, LogicalType, Nullability, Schema, Table, Value};
use std::collections::HashMap;

use crate::encode::EncodedRecord;
use crate::error::TransformError;
use crate::record::Field;

/// Static definition of one dimension table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionSpec {
    /// Target table name
    pub table: &'static str,

    /// Surrogate key column (also the foreign key name in the fact table)
    pub key_column: &'static str,

    /// Defining columns, in output order
    pub fields: &'static [Field],
}

/// The five dimensions, in join order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    VehicleModel,
    Location,
    PolicyEligibility,
    District,
    Utility,
}

impl DimensionKind {
    /// Join order
    pub const ALL: [DimensionKind; 5] = [
        Self::VehicleModel,
        Self::Location,
        Self::PolicyEligibility,
        Self::District,
        Self::Utility,
    ];

    pub fn spec(&self) -> DimensionSpec {
        match self {
            Self::VehicleModel => DimensionSpec {
                table: "dim_vehicle_model",
                key_column: "vehicle_model_id",
                fields: &[
                    Field::Make,
                    Field::Model,
                    Field::ModelYear,
                    Field::EvType,
                    Field::ElectricRange,
                    Field::BaseMsrp,
                ],
            },
            Self::Location => DimensionSpec {
                table: "dim_location",
                key_column: "location_id",
                fields: &[
                    Field::State,
                    Field::County,
                    Field::City,
                    Field::PostalCode,
                    Field::Latitude,
                    Field::Longitude,
                ],
            },
            Self::PolicyEligibility => DimensionSpec {
                table: "dim_policy_eligibility",
                key_column: "policy_id",
                fields: &[Field::CafvEligibility],
            },
            Self::District => DimensionSpec {
                table: "dim_district",
                key_column: "district_id",
                fields: &[Field::LegislativeDistrict, Field::CensusTract],
            },
            Self::Utility => DimensionSpec {
                table: "dim_utility",
                key_column: "utility_id",
                fields: &[Field::ElectricUtility],
            },
        }
    }
}

/// A deduplicated dimension with its key index
#[derive(Debug, Clone)]
pub struct Dimension {
    kind: DimensionKind,
    rows: Vec<Vec<Value>>,
    index: HashMap<Vec<Value>, i64>,
}

impl Dimension {
    /// Collect distinct combinations in first-occurrence order
    pub fn build(kind: DimensionKind, records: &[EncodedRecord]) -> Self {
        let spec = kind.spec();
        let mut rows = Vec::new();
        let mut index = HashMap::new();

        for record in records {
            let key = Self::key_of(&spec, record);
            if !index.contains_key(&key) {
                rows.push(key.clone());
                index.insert(key, rows.len() as i64);
            }
        }

        Self { kind, rows, index }
    }

    fn key_of(spec: &DimensionSpec, record: &EncodedRecord) -> Vec<Value> {
        spec.fields.iter().map(|f| record.value(*f)).collect()
    }

    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    pub fn spec(&self) -> DimensionSpec {
        self.kind.spec()
    }

    /// Surrogate key for the record's defining columns; null matches null
    pub fn lookup(&self, record: &EncodedRecord) -> Option<i64> {
        self.index.get(&Self::key_of(&self.spec(), record)).copied()
    }

    /// Distinct combinations; row `i` has key `i + 1`
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Defining columns followed by the surrogate key
    pub fn schema(&self) -> Schema {
        let spec = self.spec();
        let mut columns: Vec<Column> = spec
            .fields
            .iter()
            .map(|f| Column::new(f.name(), f.logical_type()))
            .collect();
        columns.push(Column::new(spec.key_column, LogicalType::Int).with_nullability(Nullability::No));
        Schema::from_columns(columns)
    }

    pub fn to_table(&self) -> Result<Table, TransformError> {
        let mut table = Table::new(self.spec().table, self.schema());
        for (i, row) in self.rows.iter().enumerate() {
            let mut values = row.clone();
            values.push(Value::Int(i as i64 + 1));
            table.push_row(values)?;
        }
        Ok(table)
    }
}

/// Foreign keys of one record, one per dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeys {
    pub vehicle_model_id: i64,
    pub location_id: i64,
    pub policy_id: i64,
    pub district_id: i64,
    pub utility_id: i64,
}

impl ForeignKeys {
    pub fn get(&self, kind: DimensionKind) -> i64 {
        match kind {
            DimensionKind::VehicleModel => self.vehicle_model_id,
            DimensionKind::Location => self.location_id,
            DimensionKind::PolicyEligibility => self.policy_id,
            DimensionKind::District => self.district_id,
            DimensionKind::Utility => self.utility_id,
        }
    }

    fn from_slots(slots: [i64; 5]) -> Self {
        let [vehicle_model_id, location_id, policy_id, district_id, utility_id] = slots;
        Self {
            vehicle_model_id,
            location_id,
            policy_id,
            district_id,
            utility_id,
        }
    }
}

/// A record carrying every foreign key
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub record: EncodedRecord,
    pub keys: ForeignKeys,
}

/// Output of the dimensionalizer
#[derive(Debug, Clone)]
pub struct Dimensionalized {
    /// Dimensions in [`DimensionKind::ALL`] order
    pub dimensions: Vec<Dimension>,

    /// Input records in input order, with foreign keys
    pub records: Vec<JoinedRecord>,
}

/// Left-join one dimension's keys onto the records
fn join(dimension: &Dimension, records: &[EncodedRecord]) -> Result<Vec<i64>, TransformError> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            dimension
                .lookup(record)
                .ok_or_else(|| TransformError::UnresolvedForeignKey {
                    dimension: dimension.spec().table.to_string(),
                    row,
                })
        })
        .collect()
}

/// Build every dimension and attach foreign keys to every record
pub fn dimensionalize(records: &[EncodedRecord]) -> Result<Dimensionalized, TransformError> {
    let mut dimensions = Vec::with_capacity(DimensionKind::ALL.len());
    let mut slots = vec![[0i64; 5]; records.len()];

    for (position, kind) in DimensionKind::ALL.into_iter().enumerate() {
        let dimension = Dimension::build(kind, records);
        let keys = join(&dimension, records)?;
        debug_assert_eq!(keys.len(), records.len());

        for (slot, key) in slots.iter_mut().zip(keys) {
            slot[position] = key;
        }

        tracing::debug!(table = kind.spec().table, rows = dimension.len(), "built dimension");
        dimensions.push(dimension);
    }

    let records: Vec<JoinedRecord> = records
        .iter()
        .zip(slots)
        .map(|(record, slot)| JoinedRecord {
            record: record.clone(),
            keys: ForeignKeys::from_slots(slot),
        })
        .collect();

    tracing::info!(
        dimensions = dimensions.len(),
        rows = records.len(),
        "dimensionalized records"
    );
    Ok(Dimensionalized { dimensions, records })
}
