//! Least squares solver.
//!
//! The regression problems here are tiny (two columns: intercept and slope),
//! but we still solve them through an SVD of the design matrix rather than
//! the textbook normal equations:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! - SVD handles tall matrices directly (nalgebra's `QR::solve` is meant for
//!   square systems).
//! - Near-collinear columns surface as a failed solve instead of huge,
//!   meaningless coefficients.

use nalgebra::{DMatrix, DVector};

/// Singular values below this (relative to the largest) are treated as zero.
/// Callers with offset data should center and scale their columns first.
const RANK_TOLERANCE: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the design matrix is rank deficient or the solution is
/// not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !(max_sv.is_finite() && max_sv > 0.0) {
        return None;
    }
    let eps = max_sv * RANK_TOLERANCE;
    if svd.singular_values.iter().any(|&s| s <= eps) {
        return None;
    }

    let beta = svd.solve(y, eps).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}

/// Design matrix `[1, x_i]` for a straight-line fit.
pub fn line_design(x: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), 2, |r, c| if c == 0 { 1.0 } else { x[r] })
}
