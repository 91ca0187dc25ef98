//! Categorical encoder
//!
//! Maps the two free-text categorical columns onto fixed integer codes by
//! exact string match. Values outside the vocabulary are tagged
//! [`Encoded::Unknown`] so vocabulary drift in the extract is visible.

use evstar_core::{Diagnostic, DiagnosticCode, Severity, UnknownCategoryPolicy, Value};
use std::collections::HashMap;

use crate::error::{RowRef, TransformError};
use crate::record::{Field, VehicleRecord};

/// Result of encoding one categorical value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Encoded {
    /// Value found in the vocabulary
    Known(u8),

    /// Value outside the vocabulary, kept verbatim
    Unknown(String),
}

impl Encoded {
    /// Cell written to the tables: the code as text, or the original string
    pub fn to_value(&self) -> Value {
        match self {
            Self::Known(code) => Value::Text(code.to_string()),
            Self::Unknown(original) => Value::Text(original.clone()),
        }
    }
}

/// A fixed text-to-code mapping for one column
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    pub field: Field,
    pub entries: &'static [(&'static str, u8)],
}

pub const EV_TYPE_VOCABULARY: Vocabulary = Vocabulary {
    field: Field::EvType,
    entries: &[
        ("Battery Electric Vehicle (BEV)", 1),
        ("Plug-in Hybrid Electric Vehicle (PHEV)", 2),
    ],
};

pub const CAFV_VOCABULARY: Vocabulary = Vocabulary {
    field: Field::CafvEligibility,
    entries: &[
        ("Clean Alternative Fuel Vehicle Eligible", 1),
        ("Not eligible due to low battery range", 2),
        ("Eligibility unknown as battery range has not been researched", 3),
    ],
};

impl Vocabulary {
    pub fn encode(&self, value: &str) -> Encoded {
        self.entries
            .iter()
            .find(|(text, _)| *text == value)
            .map(|(_, code)| Encoded::Known(*code))
            .unwrap_or_else(|| Encoded::Unknown(value.to_string()))
    }
}

/// A record with its categorical columns encoded
///
/// The raw `ev_type`/`cafv_eligibility` strings stay on `record`; the encoded
/// columns live alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub record: VehicleRecord,
    pub ev_type: Option<Encoded>,
    pub cafv_eligibility: Option<Encoded>,
}

impl EncodedRecord {
    /// Read a field, using the encoded form for categorical columns
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::EvType => self.ev_type.as_ref().map_or(Value::Null, Encoded::to_value),
            Field::CafvEligibility => self.cafv_eligibility.as_ref().map_or(Value::Null, Encoded::to_value),
            other => self.record.value(other),
        }
    }
}

/// Output of the encoding stage
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub records: Vec<EncodedRecord>,

    /// One warning per distinct unknown value per column
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies both vocabularies to a table
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    policy: UnknownCategoryPolicy,
}

impl Encoder {
    pub fn new(policy: UnknownCategoryPolicy) -> Self {
        Self { policy }
    }

    pub fn apply(&self, records: &[VehicleRecord]) -> Result<EncodeOutcome, TransformError> {
        // (column, original) -> occurrences, in first-seen order
        let mut unknown: Vec<((Field, String), usize)> = Vec::new();
        let mut unknown_index: HashMap<(Field, String), usize> = HashMap::new();

        let mut out = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let at = RowRef { index, line: record.line };
            let ev_type = self.encode_cell(&EV_TYPE_VOCABULARY, record.ev_type.as_deref(), at)?;
            let cafv = self.encode_cell(&CAFV_VOCABULARY, record.cafv_eligibility.as_deref(), at)?;

            for (field, encoded) in [(Field::EvType, &ev_type), (Field::CafvEligibility, &cafv)] {
                if let Some(Encoded::Unknown(original)) = encoded {
                    let key = (field, original.clone());
                    match unknown_index.get(&key) {
                        Some(&slot) => unknown[slot].1 += 1,
                        None => {
                            unknown_index.insert(key.clone(), unknown.len());
                            unknown.push((key, 1));
                        }
                    }
                }
            }

            out.push(EncodedRecord {
                record: record.clone(),
                ev_type,
                cafv_eligibility: cafv,
            });
        }

        let diagnostics: Vec<Diagnostic> = unknown
            .into_iter()
            .map(|((field, original), count)| {
                tracing::warn!(column = field.name(), value = %original, count, "unknown category passed through");
                Diagnostic::new(
                    DiagnosticCode::UnknownCategory,
                    Severity::Warn,
                    format!("Unknown {} value '{}' passed through unencoded", field.name(), original),
                )
                .with_column(field.name())
                .with_count(count)
                .with_samples(vec![original])
            })
            .collect();

        tracing::info!(rows = out.len(), unknown = diagnostics.len(), "encoded categorical columns");
        Ok(EncodeOutcome {
            records: out,
            diagnostics,
        })
    }

    fn encode_cell(
        &self,
        vocabulary: &Vocabulary,
        value: Option<&str>,
        at: RowRef,
    ) -> Result<Option<Encoded>, TransformError> {
        let Some(value) = value else {
            return Ok(None);
        };

        let encoded = vocabulary.encode(value);
        if let (Encoded::Unknown(original), UnknownCategoryPolicy::Reject) = (&encoded, self.policy) {
            return Err(TransformError::UnknownCategory {
                column: vocabulary.field.name().to_string(),
                value: original.clone(),
                row: at,
            });
        }
        Ok(Some(encoded))
    }
}
