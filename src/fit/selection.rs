//! Significance-gated prediction across variable pairs.
//!
//! For each `(x, y)` pair:
//! 1. keep the training rows where both `x` and `y` are present
//! 2. fit `y` on `x`
//! 3. record the fit in the model report under `"x-y"`
//! 4. if `p < significance`, write `prefix + y` into the scoring table,
//!    predicted from the scoring table's `x`
//!
//! Pairs are independent: each one only looks at its own two fields, so a
//! missing value in one field never removes rows from another pair's fit.

use crate::domain::{ModelReport, PredictionConfig, VariablePairs, pair_key};
use crate::error::AppError;
use crate::fit::regression::fit;
use crate::table::{Column, TimeSeriesTable};

/// Fit every pair on `train` and add predictions for the significant ones to a
/// copy of `score`.
///
/// Returns the augmented scoring table (all original fields kept) and the
/// per-pair model report. Scoring rows with a missing `x` get a missing
/// prediction.
pub fn predict_significant(
    train: &TimeSeriesTable,
    score: &TimeSeriesTable,
    pairs: &VariablePairs,
    config: &PredictionConfig,
) -> Result<(TimeSeriesTable, ModelReport), AppError> {
    if !(config.significance.is_finite() && config.significance > 0.0 && config.significance <= 1.0) {
        return Err(AppError::invalid(format!(
            "Significance threshold must be within (0, 1], got {}",
            config.significance
        )));
    }

    // Structural problems fail before any fitting happens.
    for (x, y) in pairs.iter() {
        train.numeric(x)?;
        train.numeric(y)?;
        score.numeric(x)?;
    }

    let mut out = score.clone();
    let mut report = ModelReport::new();

    for (x, y) in pairs.iter() {
        let (xs, ys) = complete_rows(train.numeric(x)?, train.numeric(y)?);
        let result = fit(&xs, &ys, config.fit_intercept)?;
        let significant = result.is_significant(config.significance);
        report.insert(pair_key(x, y), result.summary(significant));

        if !significant {
            if result.is_degenerate() {
                log::warn!(
                    "{x} -> {y}: undefined p-value with {} complete rows, no prediction",
                    result.n_obs
                );
            } else {
                log::info!(
                    "{x} -> {y}: p={:.4} >= {}, no prediction",
                    result.p_value,
                    config.significance
                );
            }
            continue;
        }

        let predicted: Vec<f64> = score
            .numeric(x)?
            .iter()
            .map(|&v| if v.is_nan() { f64::NAN } else { result.predict(v) })
            .collect();
        let name = format!("{}{y}", config.prediction_prefix);
        log::info!(
            "{x} -> {y}: coef={:.4} p={:.3e}, writing `{name}`",
            result.coefficient,
            result.p_value
        );
        out.set_column(Column::numeric(name, predicted))?;
    }

    Ok((out, report))
}

/// Rows where both values are present and finite.
fn complete_rows(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip()
}
