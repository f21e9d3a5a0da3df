//! Regression over measurement batches.
//!
//! Responsibilities:
//!
//! - ordinary least-squares line through (x, y) pairs (`linear`)
//! - MSWD and chi-square p-value of the residuals (`mswd`)

pub mod linear;
pub mod mswd;

pub use linear::*;
pub use mswd::*;
