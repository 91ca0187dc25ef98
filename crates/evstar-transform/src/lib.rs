//! evstar transform - the star-schema transformation core
//!
//! Stages, in order:
//! - Field normalization (rename + type enforcement)
//! - Extract profiling (shape and distributions before imputation)
//! - Geo extraction (point text → latitude/longitude)
//! - Cascading group-median imputation
//! - Categorical encoding
//! - Dimension building and foreign-key joins
//! - Fact assembly
//!
//! Nothing here performs I/O or knows about the load target.

pub mod record;
pub mod error;
pub mod normalize;
pub mod profile;
pub mod geo;
pub mod impute;
pub mod encode;
pub mod dimension;
pub mod fact;
pub mod pipeline;

pub use record::{Field, VehicleRecord, SOURCE_FIELDS};
pub use error::{RowRef, TransformError};
pub use normalize::normalize;
pub use profile::{profile, quantile, MODEL_YEAR_QUANTILES, PROFILED_NUMERIC};
pub use geo::{GeoExtractor, GeoOutcome, EMPTY_POINT};
pub use impute::{Imputer, ImputeOutcome, IMPUTED_FIELDS};
pub use encode::{Encoded, EncodedRecord, Encoder, EncodeOutcome, Vocabulary, EV_TYPE_VOCABULARY, CAFV_VOCABULARY};
pub use dimension::{dimensionalize, Dimension, DimensionKind, DimensionSpec, Dimensionalized, ForeignKeys, JoinedRecord};
pub use fact::{FactRow, FactTable, FACT_TABLE, FACT_KEY_COLUMN};
pub use pipeline::{Pipeline, StarSchema};
