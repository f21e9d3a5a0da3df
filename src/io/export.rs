//! Export per-point batch results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::{LinearFit, MeasurementBatch, RatioPoint};
use crate::error::AppError;

/// One row of the results CSV.
#[derive(Debug, Clone, Serialize)]
struct ResultRow {
    index: usize,
    x: f64,
    y: f64,
    err_x: f64,
    err_y: f64,
    y_fit: f64,
    residual: f64,
    /// Empty when `err_y` is zero.
    weighted_residual: Option<f64>,
}

/// Write per-point results (ratios, 1σ errors, fitted y, residuals).
pub fn write_results_csv(path: &Path, batch: &MeasurementBatch, fit: &LinearFit) -> Result<(), AppError> {
    if fit.residuals.len() != batch.len() {
        return Err(AppError::new(
            4,
            format!(
                "Fit has {} residuals for a batch of {} points.",
                fit.residuals.len(),
                batch.len()
            ),
        ));
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let err_x = batch.err_x();
    let err_y = batch.err_y();

    for (i, (&x, &y)) in batch.x().iter().zip(batch.y()).enumerate() {
        let residual = fit.residuals[i];
        let row = ResultRow {
            index: i + 1,
            x,
            y,
            err_x: err_x[i],
            err_y: err_y[i],
            y_fit: fit.predict(x),
            residual,
            weighted_residual: (err_y[i] > 0.0).then(|| residual / err_y[i]),
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = batch.len(), "wrote results CSV");
    Ok(())
}

/// Write bare `x,y` ratio pairs (the format `concordia -f` reads).
pub fn write_ratio_csv(path: &Path, points: &[RatioPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_ratio_records(file, points)?;

    info!(path = %path.display(), rows = points.len(), "wrote ratio CSV");
    Ok(())
}

/// Write `x,y` ratio pairs to any writer (e.g. stdout).
pub fn write_ratio_records<W: Write>(out: W, points: &[RatioPoint]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for p in points {
        writer
            .serialize(p)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn results_csv_has_header_and_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let batch = MeasurementBatch::new(vec![0.5, 1.0], vec![0.25, 0.5], 0.02, 1).unwrap();
        let fit = LinearFit {
            slope: 0.5,
            intercept: 0.0,
            residuals: vec![0.0, 0.0],
        };
        write_results_csv(&path, &batch, &fit).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,x,y,err_x,err_y,y_fit,residual,weighted_residual");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,0.5,0.25,0.01,0.005,0.25,0.0,0.0"));
    }

    #[test]
    fn zero_error_leaves_weighted_residual_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let batch = MeasurementBatch::new(vec![0.5, 1.0], vec![0.0, 0.5], 0.02, 1).unwrap();
        let fit = LinearFit {
            slope: 1.0,
            intercept: -0.5,
            residuals: vec![0.0, 0.0],
        };
        write_results_csv(&path, &batch, &fit).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.ends_with(','), "got {row}");
    }

    #[test]
    fn ratio_csv_round_trips_through_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratios.csv");
        let points = vec![RatioPoint { x: 0.5, y: 0.06 }, RatioPoint { x: 0.75, y: 0.08 }];

        write_ratio_csv(&path, &points).unwrap();
        let table = crate::io::load_ratio_csv(&path).unwrap();
        assert_eq!(table.points, points);
    }
}
