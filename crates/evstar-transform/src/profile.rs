//! Extract profiler
//!
//! Summarizes the normalized records before any imputation, so zeros still
//! count as observations. Quantiles use linear interpolation between the
//! closest ranks.

use evstar_core::{CategoryProfile, DataProfile, NumericProfile, QuantileValue, ValueCount};
use std::collections::HashMap;

use crate::record::{Field, VehicleRecord};

/// Quantiles reported for `model_year`
pub const MODEL_YEAR_QUANTILES: [f64; 7] = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];

/// Float columns described in the profile
pub const PROFILED_NUMERIC: [Field; 2] = [Field::ElectricRange, Field::BaseMsrp];

/// Quantile `q` of an ascending slice
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn describe(field: Field, records: &[VehicleRecord]) -> NumericProfile {
    let mut values: Vec<f64> = records.iter().filter_map(|r| r.numeric(field)).collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std = match mean {
        Some(mean) if count > 1 => {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((squares / (count - 1) as f64).sqrt())
        }
        _ => None,
    };

    NumericProfile {
        column: field.name().to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

fn model_year_quantiles(records: &[VehicleRecord]) -> Vec<QuantileValue> {
    let mut years: Vec<f64> = records.iter().map(|r| r.model_year as f64).collect();
    years.sort_by(f64::total_cmp);

    MODEL_YEAR_QUANTILES
        .iter()
        .filter_map(|&q| {
            quantile(&years, q).map(|value| QuantileValue {
                quantile: q,
                value: value as i64,
            })
        })
        .collect()
}

fn value_counts(field: Field, records: &[VehicleRecord]) -> Vec<ValueCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(value) = record.value(field).as_text() {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

/// Profile the normalized extract; `columns` is the width of the source header
pub fn profile(columns: usize, records: &[VehicleRecord]) -> DataProfile {
    let mut ev_types = value_counts(Field::EvType, records);
    ev_types.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    let mut eligibility = value_counts(Field::CafvEligibility, records);
    eligibility.sort_by(|a, b| a.value.cmp(&b.value));

    let profile = DataProfile {
        rows: records.len(),
        columns,
        numeric: PROFILED_NUMERIC.iter().map(|&f| describe(f, records)).collect(),
        model_year: model_year_quantiles(records),
        categories: vec![
            CategoryProfile {
                column: Field::EvType.name().to_string(),
                counts: ev_types,
            },
            CategoryProfile {
                column: Field::CafvEligibility.name().to_string(),
                counts: eligibility,
            },
        ],
    };

    tracing::debug!(rows = profile.rows, columns = profile.columns, "profiled extract");
    profile
}
