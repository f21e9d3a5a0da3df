//! Data sources that do not come from a user file.

pub mod sample;

pub use sample::*;
