//! Single-variable linear regression with significance statistics.
//!
//! The fit composes two steps: `math::ols` solves for the coefficients, then
//! `math::stats` derives standard errors, t-statistics and p-values from the
//! solver output.
//!
//! By default the intercept is fixed at zero (`y = a·x`). A free intercept is
//! only estimated when the caller asks for it.

use nalgebra::{DMatrix, DVector};

use crate::domain::ModelSummary;
use crate::error::AppError;
use crate::math::{inference, ols, r_squared};

/// Outcome of one fit. Undefined statistics are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub coefficient: f64,
    /// Zero unless the intercept was estimated.
    pub intercept: f64,
    pub r_squared: f64,
    pub std_error: f64,
    pub t_stat: f64,
    /// Two-sided p-value of the slope.
    pub p_value: f64,
    /// Standard error of the intercept when it was estimated.
    pub intercept_std_error: Option<f64>,
    pub n_obs: usize,
    pub dof: usize,
}

impl RegressionResult {
    fn undefined(n_obs: usize, fit_intercept: bool) -> Self {
        Self {
            coefficient: f64::NAN,
            intercept: if fit_intercept { f64::NAN } else { 0.0 },
            r_squared: f64::NAN,
            std_error: f64::NAN,
            t_stat: f64::NAN,
            p_value: f64::NAN,
            intercept_std_error: fit_intercept.then_some(f64::NAN),
            n_obs,
            dof: 0,
        }
    }

    /// Too few observations (or no variation in `x`) to test the slope.
    pub fn is_degenerate(&self) -> bool {
        self.p_value.is_nan()
    }

    /// Strict `p < threshold`; an undefined p-value never passes.
    pub fn is_significant(&self, threshold: f64) -> bool {
        self.p_value < threshold
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.coefficient * x
    }

    pub fn summary(&self, significant: bool) -> ModelSummary {
        ModelSummary {
            coefficient: self.coefficient,
            intercept: self.intercept,
            r_square: self.r_squared,
            p_value: self.p_value,
            std_error: self.std_error,
            t_stat: self.t_stat,
            n_obs: self.n_obs,
            significant,
        }
    }
}

/// Fit `y = coefficient·x (+ intercept)` by ordinary least squares.
///
/// Inputs must be equal-length and free of missing values. Degenerate inputs
/// (`n <= p`, including `n = 0`) are not errors: they produce a result whose
/// standard error and p-value are `NaN`.
pub fn fit(x: &[f64], y: &[f64], fit_intercept: bool) -> Result<RegressionResult, AppError> {
    if x.len() != y.len() {
        return Err(AppError::invalid(format!(
            "Regression inputs differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AppError::invalid("Regression inputs must not contain missing values"));
    }

    let n = x.len();
    let p = if fit_intercept { 2 } else { 1 };

    // Slope first, intercept (if any) second.
    let design = DMatrix::from_fn(n, p, |i, j| if j == 0 { x[i] } else { 1.0 });
    let target = DVector::from_column_slice(y);

    let Some(solution) = ols(&design, &target) else {
        return Ok(RegressionResult::undefined(n, fit_intercept));
    };
    let stats = inference(&solution);

    let result = RegressionResult {
        coefficient: solution.beta[0],
        intercept: if fit_intercept { solution.beta[1] } else { 0.0 },
        r_squared: r_squared(y, solution.fitted.as_slice()),
        std_error: stats.std_errors[0],
        t_stat: stats.t_stats[0],
        p_value: stats.p_values[0],
        intercept_std_error: fit_intercept.then(|| stats.std_errors[1]),
        n_obs: n,
        dof: stats.dof,
    };

    log::debug!(
        "ols fit: n={n} coef={:.6} intercept={:.6} r2={:.4} se={:.6} t={:.4} p={:.6}",
        result.coefficient,
        result.intercept,
        result.r_squared,
        result.std_error,
        result.t_stat,
        result.p_value
    );

    Ok(result)
}
