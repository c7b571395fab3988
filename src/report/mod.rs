//! Reporting utilities: model reports and table summaries for the terminal.

pub mod format;

pub use format::*;
