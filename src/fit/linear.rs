//! Straight-line fit of paired isotope ratios.
//!
//! Given `x_i`, `y_i` we find the slope and intercept minimizing
//!
//! ```text
//! Σ (y_i - (slope · x_i + intercept))^2
//! ```
//!
//! and report the residual of every point. The fit is recomputed from the full
//! batch on every call; there is no incremental update.

use nalgebra::DVector;
use tracing::{debug, trace};

use crate::domain::LinearFit;
use crate::error::AgeError;
use crate::math::{line_design, mean, solve_least_squares};

/// Minimum number of points for a two-parameter line.
pub const MIN_FIT_POINTS: usize = 2;

/// Fit `y = slope · x + intercept` by ordinary least squares.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, AgeError> {
    if x.len() != y.len() {
        return Err(AgeError::invalid(format!(
            "x and y must have equal length (x={}, y={})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < MIN_FIT_POINTS {
        return Err(AgeError::InsufficientData {
            required: MIN_FIT_POINTS,
            actual: x.len(),
        });
    }
    if let Some(idx) = x.iter().zip(y).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
        return Err(AgeError::invalid(format!("non-finite value at index {idx}")));
    }

    let (mx, sxx) = check_x_spread(x)?;

    // Standardized x keeps both design columns at norm sqrt(n), so a large
    // offset with a small spread stays well conditioned.
    let scale = (sxx / x.len() as f64).sqrt();
    let z: Vec<f64> = x.iter().map(|&v| (v - mx) / scale).collect();

    let design = line_design(&z);
    let obs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &obs).ok_or_else(|| {
        AgeError::DegenerateFit("x values are too close to collinear with the intercept".to_string())
    })?;

    let slope = beta[1] / scale;
    let intercept = beta[0] - slope * mx;
    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - (slope * xi + intercept))
        .collect();

    debug!(n = x.len(), slope, intercept, "linear fit");
    trace!(?residuals, "linear fit residuals");

    Ok(LinearFit {
        slope,
        intercept,
        residuals,
    })
}

/// Zero variance in x leaves the slope undetermined.
/// Returns the mean of `x` and its sum of squared deviations.
fn check_x_spread(x: &[f64]) -> Result<(f64, f64), AgeError> {
    let first = x[0];
    if x.iter().all(|&v| v == first) {
        return Err(AgeError::DegenerateFit(format!(
            "all {} x values are identical ({first}); slope is undefined",
            x.len()
        )));
    }

    let mx = mean(x);
    let sxx: f64 = x.iter().map(|&v| (v - mx) * (v - mx)).sum();
    let scale: f64 = x.iter().map(|&v| v * v).sum();
    if !(sxx > scale * f64::EPSILON * f64::EPSILON) {
        return Err(AgeError::DegenerateFit(format!(
            "x variance {sxx:e} is zero at working precision"
        )));
    }
    Ok((mx, sxx))
}
