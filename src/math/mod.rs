//! Numerical building blocks: the least-squares solver and the inference
//! statistics derived from its output.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
