//! U-Pb concordia curve sampling.
//!
//! The concordia is the locus of ratio pairs produced by a single undisturbed
//! decay age `t`:
//!
//! ```text
//! x(t) = 207Pb/235U = exp(λ235 · t) - 1
//! y(t) = 206Pb/238U = exp(λ238 · t) - 1
//! ```
//!
//! Samples are evaluated independently (in parallel) and collected in index
//! order, so the output is identical to a sequential loop.

use rayon::prelude::*;
use tracing::debug;

use crate::decay::{U235_PB207, U238_PB206, check_decay_constant, lookup, ratio_at_age};
use crate::domain::{ConcordiaConfig, ConcordiaCurve, ConcordiaPoint, ConcordiaTick, YEARS_PER_MA};
use crate::error::AgeError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// The first sample is exactly `min` and the last exactly `max`.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AgeError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AgeError::InvalidConfig(format!(
            "invalid time domain: min={min}, max={max} (must be finite and max > min)"
        )));
    }
    if steps < 2 {
        return Err(AgeError::InvalidConfig(format!("resolution must be >= 2 (got {steps})")));
    }

    let last = steps - 1;
    let step = (max - min) / last as f64;
    Ok((0..steps)
        .map(|i| if i == last { max } else { min + step * i as f64 })
        .collect())
}

/// Concordia coordinates `(x, y)` at `t_years`.
pub fn concordia_point(lambda_238: f64, lambda_235: f64, t_years: f64) -> (f64, f64) {
    (ratio_at_age(lambda_235, t_years), ratio_at_age(lambda_238, t_years))
}

/// Sample the concordia over `[0, t_max]` and evaluate the tick ages.
pub fn sample_concordia(
    lambda_238: f64,
    lambda_235: f64,
    config: &ConcordiaConfig,
) -> Result<ConcordiaCurve, AgeError> {
    check_decay_constant(lambda_238)?;
    check_decay_constant(lambda_235)?;
    if !(config.t_max_ma.is_finite() && config.t_max_ma > 0.0) {
        return Err(AgeError::InvalidConfig(format!(
            "t_max must be finite and > 0 Ma (got {})",
            config.t_max_ma
        )));
    }
    if let Some(bad) = config.tick_ages_ma.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
        return Err(AgeError::InvalidConfig(format!("tick age {bad} Ma must be finite and >= 0")));
    }

    let times_ma = lin_space(0.0, config.t_max_ma, config.resolution)?;

    let points: Vec<ConcordiaPoint> = times_ma
        .par_iter()
        .map(|&t_ma| {
            let (x, y) = concordia_point(lambda_238, lambda_235, t_ma * YEARS_PER_MA);
            ConcordiaPoint { t_ma, x, y }
        })
        .collect();

    let ticks: Vec<ConcordiaTick> = config
        .tick_ages_ma
        .iter()
        .map(|&age_ma| {
            let (x, y) = concordia_point(lambda_238, lambda_235, age_ma * YEARS_PER_MA);
            ConcordiaTick { age_ma, x, y }
        })
        .collect();

    debug!(
        points = points.len(),
        ticks = ticks.len(),
        t_max_ma = config.t_max_ma,
        "concordia sampled"
    );

    Ok(ConcordiaCurve {
        lambda_238,
        lambda_235,
        points,
        ticks,
    })
}

/// Sample the concordia with the registry's 238U and 235U decay constants.
pub fn uranium_lead_concordia(config: &ConcordiaConfig) -> Result<ConcordiaCurve, AgeError> {
    let u238 = lookup(U238_PB206)?;
    let u235 = lookup(U235_PB207)?;
    sample_concordia(u238.decay_constant, u235.decay_constant, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.0, 4500.0, 500).unwrap();
        assert_eq!(v.len(), 500);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[499], 4500.0);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn lin_space_rejects_bad_domains() {
        assert!(matches!(lin_space(0.0, 0.0, 10), Err(AgeError::InvalidConfig(_))));
        assert!(matches!(lin_space(0.0, 10.0, 1), Err(AgeError::InvalidConfig(_))));
        assert!(matches!(lin_space(0.0, f64::NAN, 10), Err(AgeError::InvalidConfig(_))));
    }

    #[test]
    fn default_curve_is_monotonic_and_starts_at_origin() {
        let curve = uranium_lead_concordia(&ConcordiaConfig::default()).unwrap();
        assert_eq!(curve.points.len(), 500);
        assert_eq!(curve.points[0].x, 0.0);
        assert_eq!(curve.points[0].y, 0.0);
        assert_eq!(curve.points[499].t_ma, 4500.0);
        for w in curve.points.windows(2) {
            assert!(w[1].x > w[0].x, "x must increase");
            assert!(w[1].y > w[0].y, "y must increase");
        }
    }

    #[test]
    fn ticks_match_decay_law() {
        let curve = uranium_lead_concordia(&ConcordiaConfig::default()).unwrap();
        let ages: Vec<f64> = curve.ticks.iter().map(|t| t.age_ma).collect();
        assert_eq!(ages, vec![500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 3500.0, 4000.0]);

        let t = 500.0e6;
        let tick = curve.ticks[0];
        assert_relative_eq!(tick.x, (curve.lambda_235 * t).exp() - 1.0, max_relative = 1e-12);
        assert_relative_eq!(tick.y, (curve.lambda_238 * t).exp() - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn parallel_sampling_matches_sequential() {
        let config = ConcordiaConfig {
            t_max_ma: 3000.0,
            resolution: 257,
            tick_ages_ma: vec![],
        };
        let curve = uranium_lead_concordia(&config).unwrap();
        let times = lin_space(0.0, 3000.0, 257).unwrap();
        for (p, t_ma) in curve.points.iter().zip(times) {
            let (x, y) = concordia_point(curve.lambda_238, curve.lambda_235, t_ma * YEARS_PER_MA);
            assert_eq!(p.x.to_bits(), x.to_bits());
            assert_eq!(p.y.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn resolution_is_configurable() {
        let config = ConcordiaConfig {
            t_max_ma: 100.0,
            resolution: 2,
            tick_ages_ma: vec![50.0],
        };
        let curve = uranium_lead_concordia(&config).unwrap();
        assert_eq!(curve.points.len(), 2);
        assert_eq!(curve.ticks.len(), 1);

        let bad = ConcordiaConfig { resolution: 1, ..config };
        assert!(matches!(uranium_lead_concordia(&bad), Err(AgeError::InvalidConfig(_))));
    }
}
