//! Input/output helpers.
//!
//! - CSV ingest shared by all sources (`ingest`)
//! - per-source adapters (`sources`) and rp5 code translation (`codes`)
//! - table/report exports (`export`)

pub mod codes;
pub mod export;
pub mod ingest;
pub mod sources;

pub use export::*;
pub use ingest::{parse_source, read_source};
