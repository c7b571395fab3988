//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - timestamp keys and bucketing (`Stamp`, `Cadence`, `CadencePolicy`)
//! - alignment options (`JoinHow`, `Axis`)
//! - source identifiers (`SourceKind`, `SourceInput`)
//! - regression inputs/outputs (`VariablePairs`, `PredictionConfig`, `ModelSummary`)

pub mod types;

pub use types::*;
