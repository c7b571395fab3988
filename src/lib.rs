//! `meteo-harmonize` library crate.
//!
//! The binary (`meteo`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - source adapters, harmonization and regression can be reused on their own

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod harmonize;
pub mod io;
pub mod math;
pub mod report;
pub mod table;
