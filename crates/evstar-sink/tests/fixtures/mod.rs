//! Test fixtures for sink integration tests
//!
//! Small versions of the six star-schema tables, with the same names and
//! column layouts the transform produces.

#![allow(dead_code)]

use evstar_core::{Column, LogicalType, Nullability, Schema, Table, Value};

pub const LOAD_ORDER: [&str; 6] = [
    "dim_vehicle_model",
    "dim_location",
    "dim_policy_eligibility",
    "dim_district",
    "dim_utility",
    "fact_ev",
];

fn key(name: &str) -> Column {
    Column::new(name, LogicalType::Int).with_nullability(Nullability::No)
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn build(name: &str, columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Table {
    let mut table = Table::new(name, Schema::from_columns(columns));
    for row in rows {
        table.push_row(row).unwrap();
    }
    table
}

pub fn vehicle_model_table() -> Table {
    build(
        "dim_vehicle_model",
        vec![
            Column::new("make", LogicalType::String),
            Column::new("model", LogicalType::String),
            Column::new("model_year", LogicalType::Int),
            Column::new("ev_type", LogicalType::String),
            Column::new("electric_range", LogicalType::Float),
            Column::new("base_msrp", LogicalType::Float),
            key("vehicle_model_id"),
        ],
        vec![
            vec![
                text("TESLA"),
                text("MODEL 3"),
                Value::Int(2020),
                text("1"),
                Value::Float(150.0),
                Value::Float(45000.0),
                Value::Int(1),
            ],
            vec![
                text("NISSAN"),
                text("LEAF"),
                Value::Int(2013),
                text("1"),
                Value::Float(84.0),
                Value::Float(45000.0),
                Value::Int(2),
            ],
        ],
    )
}

pub fn location_table() -> Table {
    build(
        "dim_location",
        vec![
            Column::new("state", LogicalType::String),
            Column::new("county", LogicalType::String),
            Column::new("city", LogicalType::String),
            Column::new("postal_code", LogicalType::String),
            Column::new("latitude", LogicalType::Float),
            Column::new("longitude", LogicalType::Float),
            key("location_id"),
        ],
        vec![
            vec![
                text("WA"),
                text("King"),
                text("Seattle"),
                text("98101"),
                Value::Float(-122.3),
                Value::Float(47.6),
                Value::Int(1),
            ],
            vec![
                text("WA"),
                text("King"),
                text("Seattle"),
                text("98101"),
                Value::Null,
                Value::Null,
                Value::Int(2),
            ],
        ],
    )
}

pub fn policy_table() -> Table {
    build(
        "dim_policy_eligibility",
        vec![Column::new("cafv_eligibility", LogicalType::String), key("policy_id")],
        vec![
            vec![text("1"), Value::Int(1)],
            vec![text("Unknown text"), Value::Int(2)],
        ],
    )
}

pub fn district_table() -> Table {
    build(
        "dim_district",
        vec![
            Column::new("legislative_district", LogicalType::String),
            Column::new("census_tract", LogicalType::String),
            key("district_id"),
        ],
        vec![vec![text("43"), text("53033008100"), Value::Int(1)]],
    )
}

pub fn utility_table() -> Table {
    build(
        "dim_utility",
        vec![Column::new("electric_utility", LogicalType::String), key("utility_id")],
        vec![
            vec![text("CITY OF SEATTLE - (WA)|CITY OF TACOMA - (WA)"), Value::Int(1)],
            vec![Value::Null, Value::Int(2)],
        ],
    )
}

pub fn fact_table() -> Table {
    let row = |vin: &str, model: i64, location: i64, policy: i64, utility: i64, ev_id: i64| {
        vec![
            text(vin),
            text(&format!("DOL-{}", vin)),
            Value::Int(model),
            Value::Int(location),
            Value::Int(policy),
            Value::Int(1),
            Value::Int(utility),
            Value::Int(ev_id),
        ]
    };
    build(
        "fact_ev",
        vec![
            Column::new("vin", LogicalType::String),
            Column::new("dol_vehicle_id", LogicalType::String),
            key("vehicle_model_id"),
            key("location_id"),
            key("policy_id"),
            key("district_id"),
            key("utility_id"),
            key("ev_id"),
        ],
        vec![
            row("5YJ3E1EA1K", 1, 1, 1, 1, 1),
            row("1N4AZ0CP5D", 2, 2, 2, 2, 2),
            row("5YJ3E1EA1K", 1, 1, 1, 1, 3),
        ],
    )
}

/// All six tables in load order
pub fn star_tables() -> Vec<Table> {
    vec![
        vehicle_model_table(),
        location_table(),
        policy_table(),
        district_table(),
        utility_table(),
        fact_table(),
    ]
}
