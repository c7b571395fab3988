//! Classical inference statistics for a least-squares solution.
//!
//! Given a solver output with `n` observations and `p` parameters:
//!
//! - residual variance `σ² = SSE / (n - p)`
//! - standard errors `se_j = sqrt(σ² · [(XᵀX)⁻¹]_jj)`
//! - t-statistics `t_j = β_j / se_j`
//! - two-sided p-values from Student-t with `n - p` degrees of freedom
//!
//! With `n <= p` (or a singular Gram matrix) these are undefined and come
//! back as `NaN`.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::math::ols::OlsSolution;

/// Per-coefficient inference statistics, in the solver's column order.
#[derive(Debug, Clone)]
pub struct Inference {
    pub std_errors: Vec<f64>,
    pub t_stats: Vec<f64>,
    pub p_values: Vec<f64>,
    /// Residual degrees of freedom (`n - p`, zero when underdetermined).
    pub dof: usize,
}

pub fn inference(solution: &OlsSolution) -> Inference {
    let p = solution.n_params();
    let n = solution.n_obs();

    let Some(gram_inverse) = solution.gram_inverse.as_ref().filter(|_| n > p) else {
        return Inference {
            std_errors: vec![f64::NAN; p],
            t_stats: vec![f64::NAN; p],
            p_values: vec![f64::NAN; p],
            dof: n.saturating_sub(p),
        };
    };

    let dof = n - p;
    let sigma2 = solution.sse() / dof as f64;

    let std_errors: Vec<f64> = (0..p)
        .map(|j| (sigma2 * gram_inverse[(j, j)]).sqrt())
        .collect();
    let t_stats: Vec<f64> = solution
        .beta
        .iter()
        .zip(&std_errors)
        .map(|(b, se)| b / se)
        .collect();
    let p_values = t_stats.iter().map(|&t| two_sided_p_value(t, dof)).collect();

    Inference {
        std_errors,
        t_stats,
        p_values,
        dof,
    }
}

/// `P(|T| >= |t|)` for `T ~ Student-t(dof)`.
pub fn two_sided_p_value(t: f64, dof: usize) -> f64 {
    if t.is_nan() || dof == 0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        // Zero residual variance with a non-zero coefficient.
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, dof as f64) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Coefficient of determination `1 - SS_res / SS_tot`, with `SS_tot` taken
/// about the mean of `y` regardless of whether an intercept was fitted.
///
/// Constant `y` scores 1 for an exact fit and 0 otherwise; fewer than two
/// observations give `NaN`.
pub fn r_squared(y: &[f64], fitted: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 || fitted.len() != n {
        return f64::NAN;
    }
    let mean = y.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: f64 = y.iter().zip(fitted).map(|(v, f)| (v - f).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ols::ols;
    use nalgebra::{DMatrix, DVector};

    #[test]
    fn p_value_matches_known_quantiles() {
        // t_{0.975, 10} ≈ 2.228
        let p = two_sided_p_value(2.228_138_851_986, 10);
        assert!((p - 0.05).abs() < 1e-6, "got {p}");
        assert!((two_sided_p_value(0.0, 5) - 1.0).abs() < 1e-12);
        assert_eq!(two_sided_p_value(f64::INFINITY, 3), 0.0);
        assert!(two_sided_p_value(f64::NAN, 3).is_nan());
        assert!(two_sided_p_value(1.0, 0).is_nan());
    }

    #[test]
    fn standard_error_for_slope_only_fit() {
        // y = [1, 3, 2], x = [1, 2, 3]; β = 13/14
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 3.0, 2.0]);
        let sol = ols(&x, &y).unwrap();
        let inf = inference(&sol);

        let beta: f64 = 13.0 / 14.0;
        let sse: f64 = [1.0, 3.0, 2.0]
            .iter()
            .zip([1.0, 2.0, 3.0])
            .map(|(yv, xv)| (yv - beta * xv).powi(2))
            .sum();
        let se = (sse / 2.0 / 14.0).sqrt();
        assert_eq!(inf.dof, 2);
        assert!((inf.std_errors[0] - se).abs() < 1e-12);
        assert!((inf.t_stats[0] - beta / se).abs() < 1e-9);
    }

    #[test]
    fn underdetermined_fit_is_undefined() {
        let x = DMatrix::from_column_slice(1, 1, &[2.0]);
        let y = DVector::from_row_slice(&[4.0]);
        let inf = inference(&ols(&x, &y).unwrap());
        assert_eq!(inf.dof, 0);
        assert!(inf.std_errors[0].is_nan());
        assert!(inf.p_values[0].is_nan());
    }

    #[test]
    fn r_squared_edge_cases() {
        assert!((r_squared(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-12);
        assert_eq!(r_squared(&[2.0, 2.0], &[2.0, 2.0]), 1.0);
        assert_eq!(r_squared(&[2.0, 2.0], &[1.0, 3.0]), 0.0);
        assert!(r_squared(&[1.0], &[1.0]).is_nan());
        // Fits through the origin can do worse than the mean.
        assert!(r_squared(&[10.0, 10.1, 9.9], &[1.0, 2.0, 3.0]) < 0.0);
    }
}
