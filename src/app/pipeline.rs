//! Shared batch pipeline used by the `concordia` command and the tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> line fit -> MSWD -> average age -> concordia
//!
//! Front-ends then only deal with presentation (printing, plotting, exports).

use tracing::warn;

use crate::age::estimate_average_age;
use crate::concordia::uranium_lead_concordia;
use crate::decay::{U238_PB206, lookup};
use crate::domain::{
    AgeEstimate, BatchConfig, BatchSummary, ConcordiaConfig, ConcordiaCurve, GoodnessOfFit, LinearFit,
    MeasurementBatch,
};
use crate::error::{AgeError, AppError};
use crate::fit::{evaluate_fit, fit_line};
use crate::io::ingest::{IngestedBatch, load_batch};

/// Core outputs for one measurement batch.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch: MeasurementBatch,
    pub fit: LinearFit,
    /// `None` when MSWD is undefined (see `goodness_note`).
    pub goodness: Option<GoodnessOfFit>,
    pub goodness_note: Option<String>,
    pub age: AgeEstimate,
    pub curve: ConcordiaCurve,
}

impl BatchResult {
    /// Compact summary stored in exported curve files.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            points: self.batch.points(),
            relative_error: self.batch.relative_error(),
            sigma_level: self.batch.sigma_level(),
            slope: self.fit.slope,
            intercept: self.fit.intercept,
            age: self.age.clone(),
            goodness: self.goodness,
        }
    }
}

/// All computed outputs of a single `geochron concordia` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedBatch,
    pub result: BatchResult,
}

/// Load the configured CSV and run the batch pipeline on it.
pub fn run_batch(config: &BatchConfig) -> Result<RunOutput, AppError> {
    let ingest = load_batch(config)?;
    let result = run_batch_on(ingest.batch.clone(), &config.concordia)?;
    Ok(RunOutput { ingest, result })
}

/// Run fit, goodness of fit, average age and concordia sampling on a batch.
///
/// An undefined MSWD (too few points, zero uncertainty) is carried in the
/// result instead of aborting; every other error is returned.
pub fn run_batch_on(batch: MeasurementBatch, concordia: &ConcordiaConfig) -> Result<BatchResult, AgeError> {
    let fit = fit_line(batch.x(), batch.y())?;

    let err_y = batch.err_y();
    let (goodness, goodness_note) = match evaluate_fit(&fit.residuals, &err_y) {
        Ok(gof) => (Some(gof), None),
        Err(AgeError::UndefinedFit(reason)) => {
            warn!(%reason, "MSWD undefined");
            (None, Some(reason))
        }
        Err(e) => return Err(e),
    };

    let u238 = lookup(U238_PB206)?;
    let age = estimate_average_age(u238.id, batch.y(), &err_y, u238.decay_constant)?;

    let curve = uranium_lead_concordia(concordia)?;

    Ok(BatchResult {
        batch,
        fit,
        goodness,
        goodness_note,
        age,
        curve,
    })
}
