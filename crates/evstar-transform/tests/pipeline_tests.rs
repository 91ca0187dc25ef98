//! End-to-end tests for the transformation pipeline
//!
//! Each test builds a raw extract with real source headers and checks the
//! produced star schema.

mod fixtures;

use evstar_core::{DiagnosticCode, ValueCount, EmptyColumnPolicy, TransformConfig, UnknownCategoryPolicy, Value};
use evstar_transform::{DimensionKind, Pipeline, StarSchema, TransformError, FACT_TABLE};
use fixtures::{raw_table, SourceRow, BEV, CAFV_ELIGIBLE, CAFV_LOW_RANGE, CAFV_UNKNOWN, PHEV};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn run(rows: &[SourceRow]) -> StarSchema {
    Pipeline::new(&TransformConfig::default())
        .unwrap()
        .run(&raw_table(rows))
        .unwrap()
}

fn column(schema: &StarSchema, table: &str, name: &str) -> Vec<Value> {
    let tables = schema.tables().unwrap();
    let table = tables.iter().find(|t| t.name == table).unwrap();
    table.column_values(name).unwrap().cloned().collect()
}

fn mixed_rows() -> Vec<SourceRow> {
    vec![
        SourceRow::tesla("5YJ3E1EA1K").set("Base MSRP", "0"),
        SourceRow::tesla("5YJ3E1EA2K"),
        SourceRow::tesla("1N4AZ0CP5D")
            .set("Make", "NISSAN")
            .set("Model", "LEAF")
            .set("Base MSRP", "0")
            .set("Electric Range", "84")
            .set("Vehicle Location", ""),
        SourceRow::tesla("WBY8P6C05K")
            .set("Make", "BMW")
            .set("Model", "I3")
            .set("Electric Vehicle Type", PHEV)
            .set("Clean Alternative Fuel Vehicle (CAFV) Eligibility", CAFV_LOW_RANGE)
            .set("Electric Utility", ""),
        SourceRow::tesla("KNDCC3LG1L")
            .set("Make", "KIA")
            .set("Model", "NIRO")
            .set("Electric Range", "0")
            .set("Clean Alternative Fuel Vehicle (CAFV) Eligibility", CAFV_UNKNOWN)
            .set("City", "Tacoma")
            .set("Vehicle Location", "POINT (-122.44 47.25)"),
        SourceRow::tesla("5YJ3E1EA1K"),
    ]
}

#[test]
fn tesla_scenario() {
    let schema = run(&[
        SourceRow::tesla("5YJ3E1EA1K").set("Base MSRP", "0"),
        SourceRow::tesla("5YJ3E1EA2K").set("Base MSRP", "45000"),
    ]);

    assert_eq!(
        column(&schema, "dim_vehicle_model", "base_msrp"),
        vec![Value::Float(45000.0)]
    );
    assert_eq!(column(&schema, "dim_vehicle_model", "ev_type"), vec![Value::Text("1".into())]);
    assert_eq!(column(&schema, "dim_location", "latitude"), vec![Value::Float(-122.3)]);
    assert_eq!(column(&schema, "dim_location", "longitude"), vec![Value::Float(47.6)]);

    // identical vehicle model rows share one key
    let keys: Vec<i64> = schema.fact.rows().iter().map(|r| r.keys.vehicle_model_id).collect();
    assert_eq!(keys, vec![1, 1]);
}

#[test]
fn unknown_cafv_value_passes_through() {
    let schema = run(&[SourceRow::tesla("5YJ3E1EA1K")
        .set("Clean Alternative Fuel Vehicle (CAFV) Eligibility", "Unknown text")]);

    assert_eq!(
        column(&schema, "dim_policy_eligibility", "cafv_eligibility"),
        vec![Value::Text("Unknown text".into())]
    );
    let warning = schema
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::UnknownCategory)
        .unwrap();
    assert_eq!(warning.samples, vec!["Unknown text".to_string()]);
}

#[test]
fn unknown_value_rejected_when_configured() {
    let config = TransformConfig {
        on_unknown_category: UnknownCategoryPolicy::Reject,
        ..TransformConfig::default()
    };
    let result = Pipeline::new(&config).unwrap().run(&raw_table(&[
        SourceRow::tesla("5YJ3E1EA1K").set("Electric Vehicle Type", "Hydrogen"),
    ]));

    assert!(matches!(result, Err(TransformError::UnknownCategory { .. })));
}

#[test]
fn imputation_leaves_no_nulls() {
    let schema = run(&mixed_rows());

    for name in ["base_msrp", "electric_range"] {
        let values = column(&schema, "dim_vehicle_model", name);
        assert!(values.iter().all(|v| matches!(v, Value::Float(x) if *x != 0.0)), "{name}: {values:?}");
    }

    let msrp = schema.imputation.iter().find(|s| s.column == "base_msrp").unwrap();
    assert_eq!(msrp.zeros_replaced, 2);
    assert_eq!(msrp.remaining, 0);
}

#[test]
fn dimensions_are_unique() {
    let schema = run(&mixed_rows());

    for dimension in &schema.dimensions {
        let distinct: HashSet<_> = dimension.rows().iter().collect();
        assert_eq!(distinct.len(), dimension.len(), "{}", dimension.spec().table);
    }
}

#[test]
fn every_foreign_key_resolves_once() {
    let schema = run(&mixed_rows());

    for row in schema.fact.rows() {
        for kind in DimensionKind::ALL {
            let dimension = schema.dimension(kind).unwrap();
            let key = row.keys.get(kind);
            assert!(key >= 1 && key as usize <= dimension.len(), "{:?} key {}", kind, key);
        }
    }
}

#[test]
fn row_count_is_preserved() {
    let rows = mixed_rows();
    let schema = run(&rows);

    assert_eq!(schema.fact.len(), rows.len());
    let tables = schema.tables().unwrap();
    assert_eq!(tables.len(), 6);
    assert_eq!(tables.last().unwrap().name, FACT_TABLE);
    assert_eq!(tables.last().unwrap().row_count(), rows.len());
}

#[test]
fn surrogate_keys_are_dense() {
    let schema = run(&mixed_rows());

    for table in schema.tables().unwrap() {
        let key_column = &table.schema.columns.last().unwrap().name;
        let keys: Vec<i64> = table
            .column_values(key_column)
            .unwrap()
            .filter_map(Value::as_int)
            .collect();
        let expected: Vec<i64> = (1..=table.row_count() as i64).collect();
        assert_eq!(keys, expected, "{}", table.name);
    }
}

#[test]
fn repeated_vin_is_not_deduplicated() {
    let schema = run(&mixed_rows());
    let vins: Vec<_> = schema
        .fact
        .rows()
        .iter()
        .filter(|r| r.vin.as_deref() == Some("5YJ3E1EA1K"))
        .collect();

    assert_eq!(vins.len(), 2);
    assert_ne!(vins[0].ev_id, vins[1].ev_id);
}

#[test]
fn missing_location_yields_null_coordinates() {
    let schema = run(&mixed_rows());

    let latitudes = column(&schema, "dim_location", "latitude");
    assert!(latitudes.contains(&Value::Null));
    let diag = schema
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::GeometryUnresolved)
        .unwrap();
    assert_eq!(diag.count, 1);
}

#[test]
fn null_utility_is_its_own_dimension_row() {
    let schema = run(&mixed_rows());

    let utilities = column(&schema, "dim_utility", "electric_utility");
    assert_eq!(utilities.len(), 2);
    assert!(utilities.contains(&Value::Null));
}

#[test]
fn non_numeric_year_aborts() {
    let result = Pipeline::new(&TransformConfig::default())
        .unwrap()
        .run(&raw_table(&[SourceRow::tesla("5YJ3E1EA1K").set("Model Year", "unknown")]));

    match result {
        Err(TransformError::InvalidNumber { column, row, .. }) => {
            assert_eq!(column, "model_year");
            assert_eq!(row.line, Some(2));
        }
        other => panic!("Expected InvalidNumber, got {:?}", other),
    }
}

#[test]
fn empty_price_column_follows_policy() {
    let rows = [SourceRow::tesla("5YJ3E1EA1K").set("Base MSRP", "0")];

    let failing = Pipeline::new(&TransformConfig::default()).unwrap().run(&raw_table(&rows));
    assert!(matches!(failing, Err(TransformError::NoObservations(_))));

    let config = TransformConfig {
        on_empty_column: EmptyColumnPolicy::KeepNull,
        ..TransformConfig::default()
    };
    let schema = Pipeline::new(&config).unwrap().run(&raw_table(&rows)).unwrap();
    assert_eq!(column(&schema, "dim_vehicle_model", "base_msrp"), vec![Value::Null]);
}

#[test]
fn empty_extract_produces_empty_tables() {
    let schema = run(&[]);
    for table in schema.tables().unwrap() {
        assert_eq!(table.row_count(), 0, "{}", table.name);
    }
}

#[test]
fn profile_describes_extract_before_imputation() {
    let schema = run(&[
        SourceRow::tesla("5YJ3E1EA1A").set("Model Year", "2013").set("Base MSRP", "0"),
        SourceRow::tesla("5YJ3E1EA1B").set("Model Year", "2015"),
        SourceRow::tesla("5YJ3E1EA1C")
            .set("Model Year", "2018")
            .set("Electric Vehicle Type", PHEV),
        SourceRow::tesla("5YJ3E1EA1D")
            .set("Model Year", "2020")
            .set("Clean Alternative Fuel Vehicle (CAFV) Eligibility", CAFV_UNKNOWN),
        SourceRow::tesla("5YJ3E1EA1E").set("Model Year", "2020").set("Base MSRP", ""),
    ]);
    let profile = &schema.profile;

    assert_eq!(profile.rows, 5);
    assert_eq!(profile.columns, 17);

    let years: Vec<(f64, i64)> = profile.model_year.iter().map(|q| (q.quantile, q.value)).collect();
    assert_eq!(
        years,
        vec![
            (0.0, 2013),
            (0.1, 2013),
            (0.25, 2015),
            (0.5, 2018),
            (0.75, 2020),
            (0.9, 2020),
            (1.0, 2020),
        ]
    );

    // zero still counted, empty cell skipped
    let msrp = profile.numeric.iter().find(|n| n.column == "base_msrp").unwrap();
    assert_eq!(msrp.count, 4);
    assert_eq!(msrp.min, Some(0.0));
    assert_eq!(msrp.max, Some(45000.0));
    assert_eq!(msrp.p50, Some(45000.0));

    let range = profile.numeric.iter().find(|n| n.column == "electric_range").unwrap();
    assert_eq!(range.count, 5);
    assert_eq!(range.std, Some(0.0));

    let counts = |column: &str| -> Vec<ValueCount> {
        profile
            .categories
            .iter()
            .find(|c| c.column == column)
            .unwrap()
            .counts
            .clone()
    };
    assert_eq!(
        counts("ev_type"),
        vec![
            ValueCount { value: BEV.into(), count: 4 },
            ValueCount { value: PHEV.into(), count: 1 },
        ]
    );
    assert_eq!(
        counts("cafv_eligibility"),
        vec![
            ValueCount { value: CAFV_ELIGIBLE.into(), count: 4 },
            ValueCount { value: CAFV_UNKNOWN.into(), count: 1 },
        ]
    );
}
