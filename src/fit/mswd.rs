//! Mean Square Weighted Deviation.
//!
//! For a two-parameter line through `N` points with absolute y-uncertainties
//! `σ_i`:
//!
//! ```text
//! dof  = N - 2
//! MSWD = (1/dof) · Σ (r_i / σ_i)^2
//! p    = P(χ²_dof ≥ MSWD · dof)
//! ```
//!
//! MSWD near 1 means the scatter matches the stated uncertainties; a high
//! p-value means no statistically significant excess scatter.

use tracing::debug;

use crate::domain::GoodnessOfFit;
use crate::error::AgeError;
use crate::math::chi_square_upper_tail;

/// Parameters consumed by the straight-line fit.
const FIT_PARAMS: usize = 2;

/// Compute MSWD, degrees of freedom and p-value from fit residuals and the
/// per-point absolute y-uncertainties.
pub fn evaluate_fit(residuals: &[f64], uncertainties: &[f64]) -> Result<GoodnessOfFit, AgeError> {
    if residuals.len() != uncertainties.len() {
        return Err(AgeError::invalid(format!(
            "residuals and uncertainties must have equal length ({} vs {})",
            residuals.len(),
            uncertainties.len()
        )));
    }

    let n = residuals.len();
    if n <= FIT_PARAMS {
        return Err(AgeError::UndefinedFit(format!(
            "{n} points leave {} degrees of freedom for a two-parameter fit (need at least 3 points)",
            n.saturating_sub(FIT_PARAMS)
        )));
    }
    let dof = n - FIT_PARAMS;

    let mut chi2 = 0.0;
    for (idx, (&r, &s)) in residuals.iter().zip(uncertainties).enumerate() {
        if !r.is_finite() {
            return Err(AgeError::invalid(format!("residual {idx} is not finite")));
        }
        if !s.is_finite() || s < 0.0 {
            return Err(AgeError::invalid(format!(
                "uncertainty {idx} must be finite and >= 0 (got {s})"
            )));
        }
        if s == 0.0 {
            return Err(AgeError::UndefinedFit(format!(
                "uncertainty {idx} is zero; its weight is undefined"
            )));
        }
        let z = r / s;
        chi2 += z * z;
    }

    let mswd = chi2 / dof as f64;
    let p_value = chi_square_upper_tail(mswd * dof as f64, dof)?;

    debug!(n, dof, mswd, p_value, "goodness of fit");

    Ok(GoodnessOfFit {
        mswd,
        degrees_of_freedom: dof,
        p_value,
    })
}
