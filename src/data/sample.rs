//! Synthetic concordant batch generation.
//!
//! Each point is drawn at an age `T ± spread` (uniform), placed exactly on the
//! concordia, then perturbed by relative Gaussian noise on both ratios:
//!
//! ```text
//! x = expm1(λ235 · t) · (1 + noise · z_x)
//! y = expm1(λ238 · t) · (1 + noise · z_y)
//! ```
//!
//! The same seed always produces the same batch.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::concordia::concordia_point;
use crate::decay::{U235_PB207, U238_PB206, lookup};
use crate::domain::{RatioPoint, SampleConfig, YEARS_PER_MA};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub points: Vec<RatioPoint>,
    /// True age of each point before noise, in Ma.
    pub ages_ma: Vec<f64>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if !(config.age_ma.is_finite() && config.age_ma >= 0.0) {
        return Err(AppError::new(2, "Sample age must be finite and >= 0 Ma."));
    }
    if !(config.spread_ma.is_finite() && config.spread_ma >= 0.0) || config.spread_ma > config.age_ma {
        return Err(AppError::new(
            2,
            "Age spread must be finite, >= 0 and no larger than the age itself.",
        ));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be finite and >= 0."));
    }

    let lambda_238 = lookup(U238_PB206)?.decay_constant;
    let lambda_235 = lookup(U235_PB207)?.decay_constant;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut points = Vec::with_capacity(config.count);
    let mut ages_ma = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let t_ma = if config.spread_ma > 0.0 {
            rng.gen_range(config.age_ma - config.spread_ma..=config.age_ma + config.spread_ma)
        } else {
            config.age_ma
        };

        let (x, y) = concordia_point(lambda_238, lambda_235, t_ma * YEARS_PER_MA);
        let zx: f64 = normal.sample(&mut rng);
        let zy: f64 = normal.sample(&mut rng);

        points.push(RatioPoint {
            x: x * (1.0 + config.noise * zx),
            y: y * (1.0 + config.noise * zy),
        });
        ages_ma.push(t_ma);
    }

    debug!(count = config.count, age_ma = config.age_ma, seed = config.seed, "generated synthetic batch");

    Ok(SampleData { points, ages_ma })
}
