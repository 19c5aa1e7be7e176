//! Ordinary least squares.
//!
//! The power-law fit reduces to a straight-line regression once both axes are
//! in log space:
//!
//! ```text
//! minimize Σ (y_i - (a + b x_i))^2
//! ```
//!
//! Implementation choices:
//! - The design matrix is `[1, x]` and is solved with SVD so tall systems
//!   (thousands of daily samples, two columns) are handled robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - r² is computed from the residuals as `1 - SSE/SST`, which for a
//!   single-regressor line with intercept equals the squared Pearson
//!   correlation.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted straight line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fit `y = a + b x` by ordinary least squares.
///
/// Returns `None` when the inputs cannot determine a line: mismatched lengths,
/// fewer than two points, non-finite values, or no spread in `x`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    if !x.iter().chain(y.iter()).all(|v| v.is_finite()) {
        return None;
    }

    let x_mean = x.iter().sum::<f64>() / n as f64;
    let sxx: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();
    if sxx <= 0.0 {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    let target = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &target)?;

    let fitted = &design * &beta;
    let sse = (&target - fitted).norm_squared();
    let y_mean = target.mean();
    let sst: f64 = target.iter().map(|v| (v - y_mean).powi(2)).sum();

    // Constant y: the fitted line passes through every point.
    let r_squared = if sst > 0.0 {
        (1.0 - sse / sst).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(LineFit {
        slope: beta[1],
        intercept: beta[0],
        r_squared,
        n,
    })
}
