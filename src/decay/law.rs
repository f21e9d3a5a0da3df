//! The exponential decay law.
//!
//! For a closed system the radiogenic daughter/parent ratio after `t` years is
//!
//! ```text
//! D*/P = exp(λ t) - 1
//! ```
//!
//! and conversely `t = ln(1 + D*/P) / λ`. These two primitives back the
//! average-age estimator, the concordia sampler and the synthetic sampler.

use crate::error::AgeError;

/// Reject decay constants that are not strictly positive and finite.
pub fn check_decay_constant(lambda: f64) -> Result<(), AgeError> {
    if lambda.is_finite() && lambda > 0.0 {
        Ok(())
    } else {
        Err(AgeError::invalid(format!(
            "decay constant must be finite and > 0 (got {lambda})"
        )))
    }
}

/// Radiogenic daughter/parent ratio after `t_years`: `exp(λ t) - 1`.
pub fn ratio_at_age(lambda: f64, t_years: f64) -> f64 {
    (lambda * t_years).exp_m1()
}

/// Age in years for a daughter/parent ratio: `ln(1 + ratio) / λ`.
///
/// Ratios `<= -1` lie outside the logarithm's domain.
pub fn age_from_ratio(lambda: f64, ratio: f64) -> Result<f64, AgeError> {
    check_decay_constant(lambda)?;
    if !ratio.is_finite() {
        return Err(AgeError::invalid(format!("ratio must be finite (got {ratio})")));
    }
    if ratio <= -1.0 {
        return Err(AgeError::invalid(format!(
            "ratio {ratio} is <= -1; ln(1 + ratio) is undefined"
        )));
    }
    Ok(ratio.ln_1p() / lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LAMBDA_238: f64 = std::f64::consts::LN_2 / 4_468_000_000.0;

    #[test]
    fn ratio_and_age_are_inverse() {
        for &t in &[0.0, 1.0e6, 5.0e8, 4.5e9] {
            let r = ratio_at_age(LAMBDA_238, t);
            let back = age_from_ratio(LAMBDA_238, r).unwrap();
            assert_relative_eq!(back, t, max_relative = 1e-12, epsilon = 1e-3);
        }
    }

    #[test]
    fn one_half_life_doubles_daughter() {
        // After one half-life D*/P = 1.
        let r = ratio_at_age(LAMBDA_238, 4_468_000_000.0);
        assert_relative_eq!(r, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn ratio_outside_log_domain_is_rejected() {
        assert!(matches!(age_from_ratio(LAMBDA_238, -1.0), Err(AgeError::InvalidMeasurement(_))));
        assert!(matches!(age_from_ratio(LAMBDA_238, -3.0), Err(AgeError::InvalidMeasurement(_))));
        assert!(matches!(age_from_ratio(0.0, 0.5), Err(AgeError::InvalidMeasurement(_))));
    }
}
