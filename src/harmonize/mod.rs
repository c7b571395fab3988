//! Harmonization of per-source tables onto a shared timeline.
//!
//! - `aggregate`: collapse records into cadence buckets (daily or sub-hour means)
//! - `align`: key-based merge and positional concatenation

pub mod aggregate;
pub mod align;

pub use aggregate::*;
pub use align::*;
