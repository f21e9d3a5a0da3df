//! Command-line parsing for `geochron`.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the dating/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_RESOLUTION, DEFAULT_T_MAX_MA, PlotZoom};

pub mod picker;
pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "geochron", version, about = "Radiometric ages, MSWD and U-Pb concordia")]
pub struct Cli {
    /// Verbose logging (DEBUG level; RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the supported isotopic systems with half-lives and decay constants.
    Systems,
    /// Direct age from a parent/daughter pair (prompts for anything missing).
    Age(AgeArgs),
    /// Fit a CSV batch of U-Pb ratios, report MSWD and average age, plot the concordia.
    Concordia(ConcordiaArgs),
    /// Generate a synthetic concordant batch around a given age.
    Sample(SampleArgs),
    /// Plot a previously exported concordia JSON.
    Plot(PlotArgs),
}

/// Options for direct dating.
#[derive(Debug, Parser, Clone)]
pub struct AgeArgs {
    /// Isotopic system id (e.g. 238U-206Pb). See `geochron systems`.
    #[arg(short, long)]
    pub system: Option<String>,

    /// Remaining parent amount n (> 0).
    #[arg(short = 'n', long = "parent", value_name = "N")]
    pub parent: Option<f64>,

    /// Accumulated daughter amount h (>= 0).
    #[arg(short = 'd', long, value_name = "H")]
    pub daughter: Option<f64>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Options for the batch pipeline.
#[derive(Debug, Parser, Clone)]
pub struct ConcordiaArgs {
    /// Ratio CSV with `x` (207Pb/235U) and `y` (206Pb/238U) columns.
    ///
    /// When omitted, `*.csv` files under the current directory are listed for selection.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Relative measurement error in percent.
    #[arg(long = "error", default_value_t = 2.0, value_name = "PCT")]
    pub error_pct: f64,

    /// Sigma level used for reported uncertainties (1, 2, 3, ...).
    #[arg(long, default_value_t = 1)]
    pub sigma: u32,

    /// Upper bound of the concordia time domain (Ma).
    #[arg(long, default_value_t = DEFAULT_T_MAX_MA, value_name = "MA")]
    pub t_max: f64,

    /// Number of concordia samples.
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot window: the data extent or the whole curve.
    #[arg(long, value_enum, default_value_t = PlotZoom::Data)]
    pub zoom: PlotZoom,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-point results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the concordia (points, ticks, batch summary) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for synthetic batch generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Central age of the batch (Ma).
    #[arg(long, value_name = "MA")]
    pub age: f64,

    /// Number of points.
    #[arg(short = 'c', long, default_value_t = 20)]
    pub count: usize,

    /// Half-width of the uniform age scatter (Ma).
    #[arg(long, default_value_t = 0.0, value_name = "MA")]
    pub spread: f64,

    /// Relative Gaussian noise on each ratio, in percent.
    #[arg(long, default_value_t = 1.0, value_name = "PCT")]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `geochron concordia --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot window (data zoom needs a batch in the file).
    #[arg(long, value_enum, default_value_t = PlotZoom::Data)]
    pub zoom: PlotZoom,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
