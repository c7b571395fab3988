//! Formatted terminal output.
//!
//! We keep formatting code in one place so the harmonization and fitting code
//! stays free of presentation concerns.

use crate::domain::{ModelReport, PredictionConfig};
use crate::table::{ColumnData, TimeSeriesTable};

/// Format the per-pair model report as a fixed-width table.
pub fn format_model_report(report: &ModelReport, config: &PredictionConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Model report (significance < {}, intercept {}):\n",
        config.significance,
        if config.fit_intercept { "free" } else { "fixed at 0" }
    ));
    if report.is_empty() {
        out.push_str("  (no variable pairs)\n");
        return out;
    }

    out.push_str(&format!(
        "  {:<24} {:>5} {:>11} {:>11} {:>8} {:>11} {:>10}\n",
        "pair", "n", "coef", "intercept", "R^2", "p-value", "predicted"
    ));
    for (key, s) in report {
        out.push_str(&format!(
            "  {:<24} {:>5} {:>11} {:>11} {:>8} {:>11} {:>10}\n",
            key,
            s.n_obs,
            fmt_num(s.coefficient, 4),
            fmt_num(s.intercept, 4),
            fmt_num(s.r_square, 3),
            fmt_p(s.p_value),
            if s.significant { "yes" } else { "no" }
        ));
    }

    out
}

/// One-line-per-field summary of a table (type, present count, range).
pub fn format_table_summary(table: &TimeSeriesTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} table: {} rows x {} fields\n",
        table.label(),
        table.n_rows(),
        table.n_cols()
    ));

    for column in table.columns() {
        let line = match &column.data {
            ColumnData::Time(v) => {
                let present: Vec<_> = v.iter().flatten().collect();
                match (present.iter().min(), present.iter().max()) {
                    (Some(lo), Some(hi)) => format!("{} .. {}", lo, hi),
                    _ => "-".to_string(),
                }
            }
            ColumnData::Numeric(v) => {
                let present: Vec<f64> = v.iter().copied().filter(|x| !x.is_nan()).collect();
                if present.is_empty() {
                    "-".to_string()
                } else {
                    let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let mean = present.iter().sum::<f64>() / present.len() as f64;
                    format!("min={lo:.3} mean={mean:.3} max={hi:.3} ({} present)", present.len())
                }
            }
            ColumnData::Text(v) => format!("text ({} present)", v.iter().flatten().count()),
        };
        out.push_str(&format!("  {:<16} {}\n", column.name, line));
    }

    out
}

fn fmt_num(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "-".to_string()
    }
}

fn fmt_p(value: f64) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else if value < 1e-4 {
        format!("{value:.2e}")
    } else {
        format!("{value:.4}")
    }
}
