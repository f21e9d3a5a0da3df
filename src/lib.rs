//! `geochron` library crate.
//!
//! The binary (`geochron`) is a thin wrapper around this library so that:
//!
//! - the dating core is testable without spawning processes
//! - the core never depends on the shells (CLI, prompts, plots, files)
//! - code stays easy to navigate as the project grows
//!
//! Core: `decay`, `age`, `fit`, `concordia` (plus `math` and `domain`).
//! Shells: `app`, `cli`, `io`, `report`, `plot`, `data`.

pub mod age;
pub mod app;
pub mod cli;
pub mod concordia;
pub mod data;
pub mod decay;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
