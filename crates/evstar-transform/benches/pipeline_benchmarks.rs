//! Benchmarks for the star-schema transformation
//!
//! These benchmarks measure pipeline throughput on synthetic extracts with a
//! realistic mix of makes, models and missing values.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evstar_core::{RawTable, TransformConfig};
use evstar_transform::{dimensionalize, normalize, Encoder, GeoExtractor, Imputer, Pipeline, SOURCE_FIELDS};

const MAKES: [(&str, &[&str]); 4] = [
    ("TESLA", &["MODEL 3", "MODEL Y", "MODEL S"]),
    ("NISSAN", &["LEAF"]),
    ("KIA", &["NIRO", "EV6"]),
    ("BMW", &["I3", "X5"]),
];

const CITIES: [(&str, &str, &str); 3] = [
    ("King", "Seattle", "98101"),
    ("Pierce", "Tacoma", "98402"),
    ("Spokane", "Spokane", "99201"),
];

/// Generate an extract with N rows; every 7th price and every 11th range is zero
fn generate_extract(num_rows: usize) -> RawTable {
    let headers: Vec<String> = SOURCE_FIELDS
        .iter()
        .filter_map(|f| f.source_header())
        .map(str::to_string)
        .collect();
    let mut table = RawTable::new(headers.clone());

    for i in 0..num_rows {
        let (make, models) = MAKES[i % MAKES.len()];
        let model = models[i % models.len()];
        let (county, city, postal) = CITIES[i % CITIES.len()];
        let msrp = if i % 7 == 0 { 0 } else { 30000 + (i % 5) * 5000 };
        let range = if i % 11 == 0 { 0 } else { 80 + (i % 9) * 25 };
        let location = if i % 13 == 0 {
            String::new()
        } else {
            format!("POINT (-122.{} 47.{})", i % 100, i % 50)
        };
        let ev_type = if i % 3 == 0 {
            "Plug-in Hybrid Electric Vehicle (PHEV)"
        } else {
            "Battery Electric Vehicle (BEV)"
        };

        let cells = headers
            .iter()
            .map(|h| {
                let cell = match h.as_str() {
                    "VIN (1-10)" => format!("VIN{:07}", i),
                    "County" => county.to_string(),
                    "City" => city.to_string(),
                    "State" => "WA".to_string(),
                    "Postal Code" => postal.to_string(),
                    "Model Year" => (2012 + i % 12).to_string(),
                    "Make" => make.to_string(),
                    "Model" => model.to_string(),
                    "Electric Vehicle Type" => ev_type.to_string(),
                    "Clean Alternative Fuel Vehicle (CAFV) Eligibility" => {
                        "Clean Alternative Fuel Vehicle Eligible".to_string()
                    }
                    "Electric Range" => range.to_string(),
                    "Base MSRP" => msrp.to_string(),
                    "Legislative District" => (1 + i % 49).to_string(),
                    "DOL Vehicle ID" => (100000000 + i).to_string(),
                    "Vehicle Location" => location.clone(),
                    "Electric Utility" => "PUGET SOUND ENERGY INC".to_string(),
                    "2020 Census Tract" => format!("53033{:06}", i % 400),
                    _ => String::new(),
                };
                Some(cell)
            })
            .collect();
        table
            .push_row(Some(i as u64 + 2), cells)
            .expect("generated row matches header width");
    }

    table
}

/// Benchmark: full pipeline (1k, 10k, 50k rows)
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = Pipeline::new(&TransformConfig::default()).unwrap();

    for num_rows in [1_000, 10_000, 50_000].iter() {
        let extract = generate_extract(*num_rows);
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), num_rows, |b, _| {
            b.iter(|| black_box(pipeline.run(&extract).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: imputation alone, the only stage with grouping work
fn bench_imputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("imputation");
    let geo = GeoExtractor::new().unwrap();
    let imputer = Imputer::default();

    for num_rows in [10_000, 50_000].iter() {
        let records = geo.apply(&normalize(&generate_extract(*num_rows)).unwrap()).records;
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), num_rows, |b, _| {
            b.iter(|| black_box(imputer.apply(&records).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: dimension building and key joins
fn bench_dimensionalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("dimensionalize");
    let geo = GeoExtractor::new().unwrap();

    for num_rows in [10_000, 50_000].iter() {
        let located = geo.apply(&normalize(&generate_extract(*num_rows)).unwrap()).records;
        let imputed = Imputer::default().apply(&located).unwrap().records;
        let encoded = Encoder::default().apply(&imputed).unwrap().records;
        group.bench_with_input(BenchmarkId::from_parameter(num_rows), num_rows, |b, _| {
            b.iter(|| black_box(dimensionalize(&encoded).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_imputation, bench_dimensionalize);
criterion_main!(benches);
