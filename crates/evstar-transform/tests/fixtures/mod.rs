//! Test fixtures for pipeline integration tests
//!
//! Builds raw extract tables with the real source headers so the tests go
//! through normalization exactly like a file read would.

#![allow(dead_code)]

use evstar_core::RawTable;
use evstar_transform::SOURCE_FIELDS;

pub const BEV: &str = "Battery Electric Vehicle (BEV)";
pub const PHEV: &str = "Plug-in Hybrid Electric Vehicle (PHEV)";
pub const CAFV_ELIGIBLE: &str = "Clean Alternative Fuel Vehicle Eligible";
pub const CAFV_LOW_RANGE: &str = "Not eligible due to low battery range";
pub const CAFV_UNKNOWN: &str = "Eligibility unknown as battery range has not been researched";

/// A source row, keyed by source header
#[derive(Debug, Clone)]
pub struct SourceRow {
    cells: Vec<(&'static str, String)>,
}

impl SourceRow {
    /// A complete WA row for a 2020 TESLA MODEL 3
    pub fn tesla(vin: &str) -> Self {
        Self { cells: Vec::new() }
            .set("VIN (1-10)", vin)
            .set("County", "King")
            .set("City", "Seattle")
            .set("State", "WA")
            .set("Postal Code", "98101")
            .set("Model Year", "2020")
            .set("Make", "TESLA")
            .set("Model", "MODEL 3")
            .set("Electric Vehicle Type", BEV)
            .set("Clean Alternative Fuel Vehicle (CAFV) Eligibility", CAFV_ELIGIBLE)
            .set("Electric Range", "150")
            .set("Base MSRP", "45000")
            .set("Legislative District", "43")
            .set("DOL Vehicle ID", &format!("DOL-{}", vin))
            .set("Vehicle Location", "POINT (-122.3 47.6)")
            .set("Electric Utility", "CITY OF SEATTLE - (WA)|CITY OF TACOMA - (WA)")
            .set("2020 Census Tract", "53033008100")
    }

    /// Set a cell by source header; an empty string means missing
    pub fn set(mut self, header: &'static str, value: &str) -> Self {
        self.cells.retain(|(h, _)| *h != header);
        self.cells.push((header, value.to_string()));
        self
    }

    fn get(&self, header: &str) -> String {
        self.cells
            .iter()
            .find(|(h, _)| *h == header)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }
}

/// All 17 source headers in extract order
pub fn source_headers() -> Vec<String> {
    SOURCE_FIELDS
        .iter()
        .filter_map(|f| f.source_header())
        .map(str::to_string)
        .collect()
}

/// Build a raw table from rows, numbering source lines from 2
pub fn raw_table(rows: &[SourceRow]) -> RawTable {
    let headers = source_headers();
    let mut table = RawTable::new(headers.clone());
    for (i, row) in rows.iter().enumerate() {
        let cells = headers.iter().map(|h| Some(row.get(h))).collect();
        table.push_row(Some(i as u64 + 2), cells).unwrap();
    }
    table
}
