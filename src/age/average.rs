//! Average age of a ratio batch.
//!
//! The representative age is taken from the arithmetic mean of the
//! daughter/parent ratios:
//!
//! ```text
//! age = (1/λ) · ln(1 + mean(y))
//! ```
//!
//! Its uncertainty uses a first-order linear propagation through the log-age
//! equation, averaging each point's relative contribution:
//!
//! ```text
//! σ_age = (1/λ) · mean(σ_i / (1 + y_i))
//! ```
//!
//! This is an approximation, not a covariance-based propagation. Existing
//! result comparisons depend on these exact numbers, so the formula is kept
//! as is.

use tracing::debug;

use crate::decay::{age_from_ratio, check_decay_constant};
use crate::domain::AgeEstimate;
use crate::error::AgeError;
use crate::math::mean;

/// Estimate the batch age from ratios `y`, their absolute uncertainties, and
/// the governing system's decay constant.
pub fn estimate_average_age(
    system_id: &str,
    y: &[f64],
    uncertainties: &[f64],
    lambda: f64,
) -> Result<AgeEstimate, AgeError> {
    check_decay_constant(lambda)?;
    if y.is_empty() {
        return Err(AgeError::InsufficientData { required: 1, actual: 0 });
    }
    if y.len() != uncertainties.len() {
        return Err(AgeError::invalid(format!(
            "ratios and uncertainties must have equal length ({} vs {})",
            y.len(),
            uncertainties.len()
        )));
    }

    let mean_ratio = mean(y);
    if mean_ratio <= -1.0 {
        return Err(AgeError::invalid(format!(
            "mean ratio {mean_ratio} is <= -1; ln(1 + mean) is undefined"
        )));
    }
    let age_years = age_from_ratio(lambda, mean_ratio)?;

    let mut contributions = Vec::with_capacity(y.len());
    for (idx, (&yi, &si)) in y.iter().zip(uncertainties).enumerate() {
        let denom = 1.0 + yi;
        if denom == 0.0 || !si.is_finite() {
            return Err(AgeError::invalid(format!(
                "point {idx}: relative error term {si} / (1 + {yi}) is undefined"
            )));
        }
        contributions.push(si / denom);
    }
    let relative_error = mean(&contributions);
    let uncertainty_years = relative_error / lambda;

    debug!(
        system = system_id,
        mean_ratio,
        age_years,
        relative_error,
        uncertainty_years,
        "average age estimated"
    );

    Ok(AgeEstimate::new(system_id, lambda, age_years, Some(uncertainty_years)))
}
