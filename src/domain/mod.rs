//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement inputs (`ParentDaughter`, `MeasurementBatch`)
//! - core outputs (`LinearFit`, `GoodnessOfFit`, `AgeEstimate`, `ConcordiaCurve`)
//! - resolved run configuration (`BatchConfig`, `ConcordiaConfig`, `SampleConfig`)
//! - the exported concordia file schema (`CurveFile`)

pub mod types;

pub use types::*;
