//! Pipeline driver
//!
//! Runs the six stages in order. Every stage takes the previous stage's
//! output by reference and returns a new table, so intermediate tables can be
//! inspected independently.

use evstar_core::{DataProfile, Diagnostic, ImputationSummary, RawTable, Table, TransformConfig};

use crate::dimension::{dimensionalize, Dimension, DimensionKind};
use crate::encode::Encoder;
use crate::error::TransformError;
use crate::fact::FactTable;
use crate::geo::GeoExtractor;
use crate::impute::Imputer;
use crate::normalize::normalize;
use crate::profile::profile;

/// The transformed star schema, ready to load
#[derive(Debug, Clone)]
pub struct StarSchema {
    /// Dimensions in [`DimensionKind::ALL`] order
    pub dimensions: Vec<Dimension>,

    pub fact: FactTable,

    /// Extract profile taken before imputation
    pub profile: DataProfile,

    /// Per-column imputation counts
    pub imputation: Vec<ImputationSummary>,

    /// Non-fatal findings from every stage
    pub diagnostics: Vec<Diagnostic>,
}

impl StarSchema {
    pub fn dimension(&self, kind: DimensionKind) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.kind() == kind)
    }

    /// All six tables in load order: dimensions first, then `fact_ev`
    pub fn tables(&self) -> Result<Vec<Table>, TransformError> {
        let mut tables = self
            .dimensions
            .iter()
            .map(Dimension::to_table)
            .collect::<Result<Vec<_>, _>>()?;
        tables.push(self.fact.to_table()?);
        Ok(tables)
    }
}

/// Runs normalize → profile → geo → impute → encode → dimensionalize → fact
#[derive(Debug, Clone)]
pub struct Pipeline {
    geo: GeoExtractor,
    imputer: Imputer,
    encoder: Encoder,
}

impl Pipeline {
    pub fn new(config: &TransformConfig) -> Result<Self, TransformError> {
        Ok(Self {
            geo: GeoExtractor::new()?,
            imputer: Imputer::new(config.on_empty_column),
            encoder: Encoder::new(config.on_unknown_category),
        })
    }

    /// Transform a jurisdiction-filtered extract
    pub fn run(&self, raw: &RawTable) -> Result<StarSchema, TransformError> {
        let mut diagnostics = Vec::new();

        let normalized = normalize(raw)?;
        let profile = profile(raw.headers().len(), &normalized);

        let located = self.geo.apply(&normalized);
        diagnostics.extend(located.diagnostic);

        let imputed = self.imputer.apply(&located.records)?;
        diagnostics.extend(imputed.diagnostics);

        let encoded = self.encoder.apply(&imputed.records)?;
        diagnostics.extend(encoded.diagnostics);

        let joined = dimensionalize(&encoded.records)?;
        let fact = FactTable::assemble(&joined.records);

        tracing::info!(
            source_rows = raw.len(),
            fact_rows = fact.len(),
            diagnostics = diagnostics.len(),
            "transformation complete"
        );

        Ok(StarSchema {
            dimensions: joined.dimensions,
            fact,
            profile,
            imputation: imputed.summaries,
            diagnostics,
        })
    }
}
