//! Read/write concordia JSON files.
//!
//! Curve JSON is the portable representation of a run:
//! - the sampled concordia (points + labeled ticks) and the λs used
//! - run metadata (systems, domain, resolution, timestamp)
//! - optionally the batch summary (ratios, fit line, age, MSWD)
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::decay::{U235_PB207, U238_PB206};
use crate::domain::{BatchSummary, ConcordiaConfig, ConcordiaCurve, CurveFile};
use crate::error::AppError;

/// Tool name recorded in exported files.
pub const TOOL_NAME: &str = "geochron";

/// Assemble the exportable file for a sampled curve.
pub fn build_curve_file(curve: &ConcordiaCurve, config: &ConcordiaConfig, batch: Option<BatchSummary>) -> CurveFile {
    CurveFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        system_x: U235_PB207.to_string(),
        system_y: U238_PB206.to_string(),
        t_max_ma: config.t_max_ma,
        resolution: config.resolution,
        curve: curve.clone(),
        batch,
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    info!(path = %path.display(), points = curve.curve.points.len(), "wrote curve JSON");
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;

    if curve.curve.points.len() < 2 {
        return Err(AppError::new(2, "Curve JSON holds fewer than 2 concordia points."));
    }
    Ok(curve)
}
