//! Direct (single-sample) dating.
//!
//! Given the remaining parent amount `n` and the accumulated daughter amount
//! `h`, the age follows from the decay law:
//!
//! ```text
//! t = -(1/λ) · ln(n / (n + h))
//! ```
//!
//! `h = 0` is a valid measurement (no decay yet) and yields `t = 0`.

use tracing::debug;

use crate::decay::{IsotopicSystem, check_decay_constant};
use crate::domain::{AgeEstimate, DirectAge, ParentDaughter};
use crate::error::AgeError;

/// Age in years from parent count `n`, daughter count `h` and decay constant.
///
/// Returns `(ratio, ln(ratio), age_years)`.
pub fn age_from_counts(parent: f64, daughter: f64, lambda: f64) -> Result<(f64, f64, f64), AgeError> {
    check_decay_constant(lambda)?;
    if !(parent.is_finite() && parent > 0.0) {
        return Err(AgeError::invalid(format!(
            "parent amount n must be finite and > 0 (got {parent})"
        )));
    }
    if !(daughter.is_finite() && daughter >= 0.0) {
        return Err(AgeError::invalid(format!(
            "daughter amount h must be finite and >= 0 (got {daughter})"
        )));
    }

    let ratio = parent / (parent + daughter);
    // n > 0 and h >= 0 keep the ratio in (0, 1]; an underflowing ratio would
    // still make the logarithm infinite.
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(AgeError::invalid(format!(
            "n/(n+h) = {ratio} is outside (0, 1]"
        )));
    }

    let log_ratio = ratio.ln();
    // `-0.0 / λ` would print as "-0"; h = 0 is exactly age zero.
    let age_years = if daughter == 0.0 { 0.0 } else { -log_ratio / lambda };
    Ok((ratio, log_ratio, age_years))
}

/// Date a single parent/daughter pair against an isotopic system.
pub fn solve_direct_age(system: &IsotopicSystem, counts: ParentDaughter) -> Result<DirectAge, AgeError> {
    let (ratio, log_ratio, age_years) = age_from_counts(counts.parent, counts.daughter, system.decay_constant)?;

    debug!(
        system = system.id,
        lambda = system.decay_constant,
        ratio,
        log_ratio,
        age_years,
        "direct age solved"
    );

    Ok(DirectAge {
        estimate: AgeEstimate::new(system.id, system.decay_constant, age_years, None),
        half_life_years: system.half_life_years,
        ratio,
        log_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::decay::{U238_PB206, lookup, registry};

    #[test]
    fn uranium_scenario() {
        let system = lookup(U238_PB206).unwrap();
        let out = solve_direct_age(system, ParentDaughter { parent: 100.0, daughter: 10.0 }).unwrap();

        assert_relative_eq!(out.estimate.decay_constant, 1.5514e-10, max_relative = 1e-4);
        assert_relative_eq!(out.ratio, 0.909_090_909, max_relative = 1e-9);
        assert_relative_eq!(out.log_ratio, -0.095_310_18, max_relative = 1e-6);
        assert_relative_eq!(out.estimate.age_years, 614_365_744.1, max_relative = 1e-9);
        assert_abs_diff_eq!(out.estimate.age_ma, 614.37, epsilon = 0.01);
        assert!(out.estimate.uncertainty_years.is_none());
    }

    #[test]
    fn zero_daughter_is_age_zero_for_every_system() {
        for system in registry().unwrap().systems() {
            for &n in &[1e-6, 1.0, 250.0, 1e12] {
                let out = solve_direct_age(system, ParentDaughter { parent: n, daughter: 0.0 }).unwrap();
                assert_eq!(out.estimate.age_years, 0.0);
                assert_eq!(out.ratio, 1.0);
            }
        }
    }

    #[test]
    fn invalid_counts_are_rejected() {
        let lambda = lookup(U238_PB206).unwrap().decay_constant;
        for (n, h) in [(0.0, 10.0), (-1.0, 10.0), (10.0, -0.5), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            assert!(
                matches!(age_from_counts(n, h, lambda), Err(AgeError::InvalidMeasurement(_))),
                "n={n}, h={h} should be rejected"
            );
        }
    }

    #[test]
    fn round_trip_recovers_age() {
        for system in registry().unwrap().systems() {
            let lambda = system.decay_constant;
            for &half_lives in &[0.01, 0.5, 1.0, 3.0] {
                let t = half_lives * system.half_life_years;
                let h = (lambda * t).exp() - 1.0;
                let (_, _, age) = age_from_counts(1.0, h, lambda).unwrap();
                assert_relative_eq!(age, t, max_relative = 1e-9);
            }
        }
    }
}
