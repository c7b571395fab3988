//! Ordinary least squares solver.
//!
//! We solve small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD solve, which stays well-behaved for tall design matrices and degrades
//!   to the minimum-norm solution when columns are collinear.
//! - The solver only returns the raw pieces (β, fitted values, residuals, and
//!   the Gram-matrix inverse). Inference statistics are derived from them in
//!   `math::stats`.

use nalgebra::{DMatrix, DVector};

/// Raw output of a least-squares solve.
#[derive(Debug, Clone)]
pub struct OlsSolution {
    pub beta: DVector<f64>,
    pub fitted: DVector<f64>,
    pub residuals: DVector<f64>,
    /// `(XᵀX)⁻¹`, or `None` when the Gram matrix is singular.
    pub gram_inverse: Option<DMatrix<f64>>,
}

impl OlsSolution {
    pub fn n_obs(&self) -> usize {
        self.fitted.len()
    }

    pub fn n_params(&self) -> usize {
        self.beta.len()
    }

    pub fn sse(&self) -> f64 {
        self.residuals.norm_squared()
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y ≈ Xβ` and return coefficients plus residual diagnostics.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsSolution> {
    let beta = solve_least_squares(x, y)?;
    let fitted = x * &beta;
    let residuals = y - &fitted;
    let gram_inverse = (x.transpose() * x).try_inverse();

    Some(OlsSolution {
        beta,
        fitted,
        residuals,
        gram_inverse,
    })
}
