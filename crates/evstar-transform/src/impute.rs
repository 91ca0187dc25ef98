//! Imputer
//!
//! Fills `base_msrp` and `electric_range` with a cascading group median.
//! A literal zero means "not reported" in the extract and is treated as null.
//! Each level only sees the column as it stood before that level started:
//!
//! 1. median within (make, model)
//! 2. median within make
//! 3. global median
//!
//! Rows with a null make (or model) are not part of any group at that level.

use evstar_core::{Diagnostic, DiagnosticCode, EmptyColumnPolicy, ImputationSummary, Severity};
use std::collections::HashMap;

use crate::error::TransformError;
use crate::record::{Field, VehicleRecord};

/// Columns treated by the imputer, in treatment order
pub const IMPUTED_FIELDS: [Field; 2] = [Field::BaseMsrp, Field::ElectricRange];

/// Output of the imputation stage
#[derive(Debug, Clone)]
pub struct ImputeOutcome {
    pub records: Vec<VehicleRecord>,
    pub summaries: Vec<ImputationSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Median of the non-null values, mean of the middle pair for even counts
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Median per group key, computed from the current non-null values
fn group_medians<K>(values: &[Option<f64>], keys: &[Option<K>]) -> HashMap<K, f64>
where
    K: std::hash::Hash + Eq + Clone,
{
    let mut groups: HashMap<K, Vec<f64>> = HashMap::new();
    for (value, key) in values.iter().zip(keys) {
        if let (Some(v), Some(k)) = (value, key) {
            groups.entry(k.clone()).or_default().push(*v);
        }
    }

    groups
        .into_iter()
        .filter_map(|(k, mut vs)| median(&mut vs).map(|m| (k, m)))
        .collect()
}

/// Fill nulls from the group medians; returns the number filled
fn fill_from_groups<K>(values: &mut [Option<f64>], keys: &[Option<K>]) -> usize
where
    K: std::hash::Hash + Eq + Clone,
{
    let medians = group_medians(values, keys);
    let mut filled = 0;
    for (value, key) in values.iter_mut().zip(keys) {
        if value.is_none() {
            if let Some(m) = key.as_ref().and_then(|k| medians.get(k)) {
                *value = Some(*m);
                filled += 1;
            }
        }
    }
    filled
}

/// Cascading group-median imputer
#[derive(Debug, Clone, Copy, Default)]
pub struct Imputer {
    policy: EmptyColumnPolicy,
}

impl Imputer {
    pub fn new(policy: EmptyColumnPolicy) -> Self {
        Self { policy }
    }

    /// Impute every column in [`IMPUTED_FIELDS`]
    pub fn apply(&self, records: &[VehicleRecord]) -> Result<ImputeOutcome, TransformError> {
        let make_model: Vec<Option<(String, String)>> = records
            .iter()
            .map(|r| Some((r.make.clone()?, r.model.clone()?)))
            .collect();
        let make: Vec<Option<String>> = records.iter().map(|r| r.make.clone()).collect();

        let mut out = records.to_vec();
        let mut summaries = Vec::new();
        let mut diagnostics = Vec::new();

        for field in IMPUTED_FIELDS {
            let (values, summary) = self.impute_column(field, records, &make_model, &make)?;

            for (record, value) in out.iter_mut().zip(values) {
                if let Some(slot) = record.numeric_mut(field) {
                    *slot = value;
                }
            }

            tracing::debug!(
                column = field.name(),
                zeros = summary.zeros_replaced,
                make_model = summary.filled_by_make_model,
                make = summary.filled_by_make,
                global = summary.filled_by_global,
                remaining = summary.remaining,
                "imputed column"
            );

            if summary.filled() > 0 {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::ValueImputed,
                        Severity::Info,
                        format!(
                            "Imputed {} {} values ({} by make/model, {} by make, {} globally)",
                            summary.filled(),
                            field.name(),
                            summary.filled_by_make_model,
                            summary.filled_by_make,
                            summary.filled_by_global
                        ),
                    )
                    .with_column(field.name())
                    .with_count(summary.filled()),
                );
            }
            if summary.missing > 0 && summary.missing == records.len() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::ImputationNoObservations,
                        Severity::Warn,
                        format!(
                            "Column {} has no non-zero observation; applied '{:?}' policy",
                            field.name(),
                            self.policy
                        ),
                    )
                    .with_column(field.name())
                    .with_count(summary.missing),
                );
            }

            summaries.push(summary);
        }

        tracing::info!(rows = out.len(), "imputed missing values");
        Ok(ImputeOutcome {
            records: out,
            summaries,
            diagnostics,
        })
    }

    fn impute_column(
        &self,
        field: Field,
        records: &[VehicleRecord],
        make_model: &[Option<(String, String)>],
        make: &[Option<String>],
    ) -> Result<(Vec<Option<f64>>, ImputationSummary), TransformError> {
        let mut summary = ImputationSummary::new(field.name());

        let mut values: Vec<Option<f64>> = records
            .iter()
            .map(|r| match r.numeric(field) {
                Some(v) if v == 0.0 => {
                    summary.zeros_replaced += 1;
                    None
                }
                other => other,
            })
            .collect();
        summary.missing = values.iter().filter(|v| v.is_none()).count();

        summary.filled_by_make_model = fill_from_groups(&mut values, make_model);
        summary.filled_by_make = fill_from_groups(&mut values, make);

        let remaining = values.iter().filter(|v| v.is_none()).count();
        if remaining > 0 {
            let mut observed: Vec<f64> = values.iter().flatten().copied().collect();
            let fallback = match median(&mut observed) {
                Some(m) => Some(m),
                None => match self.policy {
                    EmptyColumnPolicy::Fail => {
                        return Err(TransformError::NoObservations(field.name().to_string()))
                    }
                    EmptyColumnPolicy::Zero => Some(0.0),
                    EmptyColumnPolicy::KeepNull => None,
                },
            };

            if let Some(m) = fallback {
                for value in values.iter_mut().filter(|v| v.is_none()) {
                    *value = Some(m);
                }
                summary.filled_by_global = remaining;
            }
        }

        summary.remaining = values.iter().filter(|v| v.is_none()).count();
        Ok((values, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(make: Option<&str>, model: Option<&str>, msrp: Option<f64>, range: Option<f64>) -> VehicleRecord {
        VehicleRecord {
            make: make.map(str::to_string),
            model: model.map(str::to_string),
            base_msrp: msrp,
            electric_range: range,
            model_year: 2020,
            ..VehicleRecord::default()
        }
    }

    #[test]
    fn median_odd_even_empty() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn zero_is_filled_from_make_model_group() {
        let outcome = Imputer::default()
            .apply(&[
                car(Some("TESLA"), Some("MODEL 3"), Some(0.0), Some(150.0)),
                car(Some("TESLA"), Some("MODEL 3"), Some(45000.0), Some(150.0)),
            ])
            .unwrap();

        assert_eq!(outcome.records[0].base_msrp, Some(45000.0));
        let msrp = &outcome.summaries[0];
        assert_eq!(msrp.column, "base_msrp");
        assert_eq!(msrp.zeros_replaced, 1);
        assert_eq!(msrp.filled_by_make_model, 1);
        assert_eq!(msrp.remaining, 0);
    }

    #[test]
    fn cascades_to_make_then_global() {
        let outcome = Imputer::default()
            .apply(&[
                car(Some("KIA"), Some("NIRO"), Some(40000.0), Some(200.0)),
                car(Some("KIA"), Some("EV6"), None, Some(0.0)),
                car(Some("FORD"), Some("F-150"), None, None),
                car(Some("BMW"), Some("I3"), Some(50000.0), Some(100.0)),
            ])
            .unwrap();

        // make median for KIA
        assert_eq!(outcome.records[1].base_msrp, Some(40000.0));
        assert_eq!(outcome.records[1].electric_range, Some(200.0));
        // global median of 40000, 40000, 50000 after the make level
        assert_eq!(outcome.records[2].base_msrp, Some(40000.0));
        // global median of 200, 200, 100
        assert_eq!(outcome.records[2].electric_range, Some(200.0));

        let msrp = &outcome.summaries[0];
        assert_eq!(msrp.filled_by_make_model, 0);
        assert_eq!(msrp.filled_by_make, 1);
        assert_eq!(msrp.filled_by_global, 1);
    }

    #[test]
    fn null_group_keys_fall_through() {
        let outcome = Imputer::default()
            .apply(&[
                car(None, None, Some(30000.0), Some(100.0)),
                car(None, None, None, Some(100.0)),
                car(Some("NISSAN"), Some("LEAF"), Some(60000.0), Some(100.0)),
            ])
            .unwrap();

        // no group for null make, global median of 30000 and 60000
        assert_eq!(outcome.records[1].base_msrp, Some(45000.0));
        assert_eq!(outcome.summaries[0].filled_by_global, 1);
    }

    #[test]
    fn empty_column_fails_by_default() {
        let result = Imputer::default().apply(&[car(Some("KIA"), Some("NIRO"), Some(0.0), Some(200.0))]);
        assert!(matches!(result, Err(TransformError::NoObservations(c)) if c == "base_msrp"));
    }

    #[test]
    fn empty_column_zero_policy() {
        let outcome = Imputer::new(EmptyColumnPolicy::Zero)
            .apply(&[car(Some("KIA"), Some("NIRO"), None, Some(200.0))])
            .unwrap();
        assert_eq!(outcome.records[0].base_msrp, Some(0.0));
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::ImputationNoObservations));
    }

    #[test]
    fn empty_column_keep_null_policy() {
        let outcome = Imputer::new(EmptyColumnPolicy::KeepNull)
            .apply(&[car(Some("KIA"), Some("NIRO"), None, Some(200.0))])
            .unwrap();
        assert_eq!(outcome.records[0].base_msrp, None);
        assert_eq!(outcome.summaries[0].remaining, 1);
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let outcome = Imputer::default().apply(&[]).unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }
}
