//! Summary statistics and the chi-square tail used for fit quality.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::AgeError;

/// Arithmetic mean (sequential, index-order summation). Returns NaN for an
/// empty slice; callers check emptiness first.
pub fn mean(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    sum / values.len() as f64
}

/// Upper-tail probability `P(X >= statistic)` for `X ~ χ²(dof)`.
///
/// Equivalent to `1 - CDF(statistic)`, evaluated through the survival
/// function so tiny tails keep their precision. The result is clamped to
/// `[0, 1]`.
pub fn chi_square_upper_tail(statistic: f64, dof: usize) -> Result<f64, AgeError> {
    if dof == 0 {
        return Err(AgeError::UndefinedFit(
            "chi-square needs at least one degree of freedom".to_string(),
        ));
    }
    if !(statistic.is_finite() && statistic >= 0.0) {
        return Err(AgeError::invalid(format!(
            "chi-square statistic must be finite and >= 0 (got {statistic})"
        )));
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| AgeError::UndefinedFit(format!("chi-square distribution: {e}")))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}
