//! In-memory tabular storage for harmonized observations.

pub mod column;
pub mod frame;

pub use column::*;
pub use frame::*;
