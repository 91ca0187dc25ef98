//! Fact assembler

use evstar_core::{Column, LogicalType, Nullability, Schema, Table, Value};

use crate::dimension::{DimensionKind, ForeignKeys, JoinedRecord};
use crate::error::TransformError;

pub const FACT_TABLE: &str = "fact_ev";

pub const FACT_KEY_COLUMN: &str = "ev_id";

/// One row of `fact_ev`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub vin: Option<String>,
    pub dol_vehicle_id: Option<String>,
    pub keys: ForeignKeys,
    pub ev_id: i64,
}

/// One fact row per source record, no deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTable {
    rows: Vec<FactRow>,
}

impl FactTable {
    /// Project natural keys and foreign keys, numbering rows from 1 in input order
    pub fn assemble(records: &[JoinedRecord]) -> Self {
        let rows: Vec<FactRow> = records
            .iter()
            .enumerate()
            .map(|(i, joined)| FactRow {
                vin: joined.record.record.vin.clone(),
                dol_vehicle_id: joined.record.record.dol_vehicle_id.clone(),
                keys: joined.keys,
                ev_id: i as i64 + 1,
            })
            .collect();

        tracing::info!(rows = rows.len(), "assembled fact table");
        Self { rows }
    }

    pub fn rows(&self) -> &[FactRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// vin, dol_vehicle_id, the five foreign keys, ev_id
    pub fn schema() -> Schema {
        let mut columns = vec![
            Column::new("vin", LogicalType::String),
            Column::new("dol_vehicle_id", LogicalType::String),
        ];
        columns.extend(DimensionKind::ALL.iter().map(|kind| {
            Column::new(kind.spec().key_column, LogicalType::Int).with_nullability(Nullability::No)
        }));
        columns.push(Column::new(FACT_KEY_COLUMN, LogicalType::Int).with_nullability(Nullability::No));
        Schema::from_columns(columns)
    }

    pub fn to_table(&self) -> Result<Table, TransformError> {
        let mut table = Table::new(FACT_TABLE, Self::schema());
        for row in &self.rows {
            let mut values = vec![
                Value::text(row.vin.as_deref()),
                Value::text(row.dol_vehicle_id.as_deref()),
            ];
            values.extend(DimensionKind::ALL.iter().map(|kind| Value::Int(row.keys.get(*kind))));
            values.push(Value::Int(row.ev_id));
            table.push_row(values)?;
        }
        Ok(table)
    }
}
