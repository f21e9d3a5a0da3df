//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the numeric core as plain values
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AgeError;

/// Years per mega-annum.
pub const YEARS_PER_MA: f64 = 1_000_000.0;

/// Default relative measurement error (2 %).
pub const DEFAULT_RELATIVE_ERROR: f64 = 0.02;

/// Default upper bound of the concordia time domain.
pub const DEFAULT_T_MAX_MA: f64 = 4500.0;

/// Default number of concordia samples.
pub const DEFAULT_RESOLUTION: usize = 500;

/// Labeled reference ages drawn on the concordia.
pub const DEFAULT_TICK_AGES_MA: [f64; 8] = [500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 3500.0, 4000.0];

/// A parent/daughter atom count pair for direct dating.
///
/// `parent` is the remaining parent amount `n`, `daughter` the accumulated
/// daughter amount `h`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParentDaughter {
    pub parent: f64,
    pub daughter: f64,
}

/// One measured isotope-ratio pair (`x = 207Pb/235U`, `y = 206Pb/238U`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPoint {
    pub x: f64,
    pub y: f64,
}

/// An ordered batch of ratio measurements sharing one relative error and one
/// sigma level.
///
/// Per-point absolute uncertainties are derived as `|v| * relative_error`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementBatch {
    x: Vec<f64>,
    y: Vec<f64>,
    relative_error: f64,
    sigma_level: u32,
}

impl MeasurementBatch {
    pub fn new(x: Vec<f64>, y: Vec<f64>, relative_error: f64, sigma_level: u32) -> Result<Self, AgeError> {
        if x.len() != y.len() {
            return Err(AgeError::invalid(format!(
                "x and y must have equal length (x={}, y={})",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AgeError::InsufficientData { required: 1, actual: 0 });
        }
        if let Some(idx) = x.iter().zip(&y).position(|(a, b)| !a.is_finite() || !b.is_finite()) {
            return Err(AgeError::invalid(format!("non-finite ratio at index {idx}")));
        }
        if !(relative_error.is_finite() && relative_error > 0.0) {
            return Err(AgeError::InvalidConfig(format!(
                "relative error must be finite and > 0 (got {relative_error})"
            )));
        }
        if sigma_level < 1 {
            return Err(AgeError::InvalidConfig("sigma level must be >= 1".to_string()));
        }

        Ok(Self {
            x,
            y,
            relative_error,
            sigma_level,
        })
    }

    pub fn from_points(points: &[RatioPoint], relative_error: f64, sigma_level: u32) -> Result<Self, AgeError> {
        let x = points.iter().map(|p| p.x).collect();
        let y = points.iter().map(|p| p.y).collect();
        Self::new(x, y, relative_error, sigma_level)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn relative_error(&self) -> f64 {
        self.relative_error
    }

    pub fn sigma_level(&self) -> u32 {
        self.sigma_level
    }

    /// Absolute 1σ uncertainty of each x value.
    pub fn err_x(&self) -> Vec<f64> {
        self.x.iter().map(|v| v.abs() * self.relative_error).collect()
    }

    /// Absolute 1σ uncertainty of each y value.
    pub fn err_y(&self) -> Vec<f64> {
        self.y.iter().map(|v| v.abs() * self.relative_error).collect()
    }

    pub fn points(&self) -> Vec<RatioPoint> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| RatioPoint { x, y })
            .collect()
    }
}

/// Ordinary least-squares line through a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Observed minus predicted y, in input order.
    pub residuals: Vec<f64>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit quality relative to stated measurement uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub mswd: f64,
    pub degrees_of_freedom: usize,
    /// Upper-tail chi-square probability of `mswd * degrees_of_freedom`.
    pub p_value: f64,
}

/// An age paired with the system and decay constant that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeEstimate {
    pub system: String,
    pub decay_constant: f64,
    pub age_years: f64,
    pub age_ma: f64,
    /// 1σ uncertainty; `None` for a direct single-sample age.
    pub uncertainty_years: Option<f64>,
    pub uncertainty_ma: Option<f64>,
}

impl AgeEstimate {
    pub fn new(system: impl Into<String>, decay_constant: f64, age_years: f64, uncertainty_years: Option<f64>) -> Self {
        Self {
            system: system.into(),
            decay_constant,
            age_years,
            age_ma: age_years / YEARS_PER_MA,
            uncertainty_years,
            uncertainty_ma: uncertainty_years.map(|u| u / YEARS_PER_MA),
        }
    }

    /// Uncertainty in Ma expanded to `sigma_level`σ. Reports lead with the 1σ value.
    pub fn scaled_uncertainty_ma(&self, sigma_level: u32) -> Option<f64> {
        self.uncertainty_ma.map(|u| u * f64::from(sigma_level))
    }
}

/// Direct age plus the intermediate values of the decay law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectAge {
    pub estimate: AgeEstimate,
    pub half_life_years: f64,
    /// `n / (n + h)`.
    pub ratio: f64,
    /// `ln(n / (n + h))`.
    pub log_ratio: f64,
}

/// One sample of the concordia curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcordiaPoint {
    pub t_ma: f64,
    /// 207Pb/235U.
    pub x: f64,
    /// 206Pb/238U.
    pub y: f64,
}

/// A labeled reference age on the concordia.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcordiaTick {
    pub age_ma: f64,
    pub x: f64,
    pub y: f64,
}

/// Sampled concordia curve over `[0, t_max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcordiaCurve {
    pub lambda_238: f64,
    pub lambda_235: f64,
    pub points: Vec<ConcordiaPoint>,
    pub ticks: Vec<ConcordiaTick>,
}

/// Time domain and resolution of the concordia sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcordiaConfig {
    pub t_max_ma: f64,
    pub resolution: usize,
    pub tick_ages_ma: Vec<f64>,
}

impl Default for ConcordiaConfig {
    fn default() -> Self {
        Self {
            t_max_ma: DEFAULT_T_MAX_MA,
            resolution: DEFAULT_RESOLUTION,
            tick_ages_ma: DEFAULT_TICK_AGES_MA.to_vec(),
        }
    }
}

/// Which window the terminal plot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotZoom {
    /// Data extent padded by 5 % on each side.
    Data,
    /// Whole sampled concordia.
    Curve,
}

/// A full batch run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub csv_path: PathBuf,
    /// Relative measurement error as a fraction (0.02 = 2 %).
    pub relative_error: f64,
    pub sigma_level: u32,
    pub concordia: ConcordiaConfig,

    pub plot: bool,
    pub zoom: PlotZoom,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// Settings for the synthetic concordant batch generator.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub age_ma: f64,
    /// Half-width of the uniform age scatter around `age_ma`.
    pub spread_ma: f64,
    pub count: usize,
    /// Relative Gaussian noise applied to each ratio (0.01 = 1 %).
    pub noise: f64,
    pub seed: u64,
}

/// Batch results stored alongside an exported concordia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub points: Vec<RatioPoint>,
    pub relative_error: f64,
    pub sigma_level: u32,
    pub slope: f64,
    pub intercept: f64,
    pub age: AgeEstimate,
    pub goodness: Option<GoodnessOfFit>,
}

/// A saved concordia file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub system_x: String,
    pub system_y: String,
    pub t_max_ma: f64,
    pub resolution: usize,
    pub curve: ConcordiaCurve,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ratios_keep_non_negative_errors() {
        let batch = MeasurementBatch::new(vec![-0.5, 0.5], vec![-0.01, 0.02], 0.02, 1).unwrap();
        assert_eq!(batch.err_x(), vec![0.01, 0.01]);
        let err_y = batch.err_y();
        assert!((err_y[0] - 0.0002).abs() < 1e-15 && (err_y[1] - 0.0004).abs() < 1e-15);

        let est = crate::age::estimate_average_age("238U-206Pb", batch.y(), &batch.err_y(), 1.55125e-10).unwrap();
        let expected = (0.0002 / 0.99 + 0.0004 / 1.02) / 2.0 / 1.55125e-10;
        assert!((est.uncertainty_years.unwrap() - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn batch_derives_absolute_errors() {
        let batch = MeasurementBatch::new(vec![0.5, 1.0], vec![0.25, -2.0], 0.02, 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.err_x(), vec![0.01, 0.02]);
        assert_eq!(batch.err_y(), vec![0.005, 0.04]);
        assert_eq!(batch.sigma_level(), 2);
    }

    #[test]
    fn batch_rejects_bad_shapes_and_settings() {
        assert!(matches!(
            MeasurementBatch::new(vec![1.0], vec![1.0, 2.0], 0.02, 1),
            Err(AgeError::InvalidMeasurement(_))
        ));
        assert!(matches!(
            MeasurementBatch::new(vec![], vec![], 0.02, 1),
            Err(AgeError::InsufficientData { required: 1, actual: 0 })
        ));
        assert!(matches!(
            MeasurementBatch::new(vec![1.0], vec![f64::NAN], 0.02, 1),
            Err(AgeError::InvalidMeasurement(_))
        ));
        assert!(matches!(
            MeasurementBatch::new(vec![1.0], vec![1.0], 0.0, 1),
            Err(AgeError::InvalidConfig(_))
        ));
        assert!(matches!(
            MeasurementBatch::new(vec![1.0], vec![1.0], 0.02, 0),
            Err(AgeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn age_estimate_converts_to_ma() {
        let est = AgeEstimate::new("238U-206Pb", 1.5e-10, 2.5e9, Some(3.0e7));
        assert_eq!(est.age_ma, 2500.0);
        assert_eq!(est.uncertainty_ma, Some(30.0));
        assert_eq!(est.scaled_uncertainty_ma(2), Some(60.0));
    }
}
