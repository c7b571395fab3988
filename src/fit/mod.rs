//! Regression and prediction.
//!
//! Responsibilities:
//!
//! - fit one explanatory variable against one response (`regression`)
//! - gate predictions on the slope's p-value across variable pairs (`selection`)

pub mod regression;
pub mod selection;

pub use regression::*;
pub use selection::*;
