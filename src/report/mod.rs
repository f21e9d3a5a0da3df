//! Reporting utilities: formatted terminal output for ages, batches and
//! saved curves.

pub mod format;

pub use format::*;
