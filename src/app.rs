//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs direct dating or the batch pipeline
//! - prints reports/plots
//! - writes optional exports

use std::io;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::{AgeArgs, Cli, Command, ConcordiaArgs, PlotArgs, SampleArgs};
use crate::domain::{BatchConfig, ConcordiaConfig, DEFAULT_TICK_AGES_MA, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `geochron` binary.
pub fn run() -> Result<(), AppError> {
    // Optional; lets RUST_LOG and GEOCHRON_SEARCH_DEPTH live in a project .env.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Systems => handle_systems(),
        Command::Age(args) => handle_age(args),
        Command::Concordia(args) => handle_concordia(args),
        Command::Sample(args) => handle_sample(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Compact stderr logging; `RUST_LOG` wins over `-v`.
fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn handle_systems() -> Result<(), AppError> {
    let registry = crate::decay::registry()?;
    print!("{}", crate::report::format_systems_table(registry.systems()));
    Ok(())
}

fn handle_age(args: AgeArgs) -> Result<(), AppError> {
    let registry = crate::decay::registry()?;
    let (system, counts) =
        crate::cli::prompt::resolve_direct_age_inputs(registry, args.system.as_deref(), args.parent, args.daughter)?;

    let result = crate::age::solve_direct_age(system, counts)?;

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::new(2, format!("Failed to serialize result: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_direct_age(&result));
    }
    Ok(())
}

fn handle_concordia(args: ConcordiaArgs) -> Result<(), AppError> {
    let csv_path = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };
    let config = batch_config_from_args(&args, csv_path);
    let run = pipeline::run_batch(&config)?;

    print!("{}", crate::report::format_ingest_summary(&run.ingest));
    print!("{}", crate::report::format_batch_result(&run.result));

    if config.plot {
        let plot = crate::plot::render_concordia_plot(
            &run.result.curve,
            &run.result.batch.points(),
            Some(crate::plot::ErrorBars {
                relative_error: run.result.batch.relative_error(),
                sigma_level: run.result.batch.sigma_level(),
            }),
            Some((run.result.fit.slope, run.result.fit.intercept)),
            config.zoom,
            config.plot_width,
            config.plot_height,
        );
        println!();
        print!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.result.batch, &run.result.fit)?;
    }
    if let Some(path) = &config.export_curve {
        let file = crate::io::curve::build_curve_file(&run.result.curve, &config.concordia, Some(run.result.summary()));
        crate::io::curve::write_curve_json(path, &file)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let sample = crate::data::generate_sample(&config)?;

    match &args.output {
        Some(path) => crate::io::export::write_ratio_csv(path, &sample.points),
        None => crate::io::export::write_ratio_records(io::stdout().lock(), &sample.points),
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::curve::read_curve_json(&args.curve)?;

    print!("{}", crate::report::format_curve_file_summary(&file));
    print!(
        "{}",
        crate::plot::render_curve_file(&file, args.zoom, args.width, args.height)
    );
    Ok(())
}

/// Resolve `concordia` flags into the pipeline's config.
pub fn batch_config_from_args(args: &ConcordiaArgs, csv_path: std::path::PathBuf) -> BatchConfig {
    BatchConfig {
        csv_path,
        relative_error: args.error_pct / 100.0,
        sigma_level: args.sigma,
        concordia: ConcordiaConfig {
            t_max_ma: args.t_max,
            resolution: args.resolution,
            tick_ages_ma: DEFAULT_TICK_AGES_MA.to_vec(),
        },
        plot: args.plot && !args.no_plot,
        zoom: args.zoom,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

/// Resolve `sample` flags (percent noise becomes a fraction).
pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        age_ma: args.age,
        spread_ma: args.spread,
        count: args.count,
        noise: args.noise / 100.0,
        seed: args.seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn concordia_flags_resolve_to_fractions() {
        let cli = Cli::parse_from([
            "geochron", "concordia", "-f", "in.csv", "--error", "5", "--sigma", "2", "--no-plot", "--t-max", "3000",
        ]);
        let Command::Concordia(args) = cli.command else {
            panic!("expected concordia");
        };
        let config = batch_config_from_args(&args, PathBuf::from("in.csv"));
        assert_eq!(config.relative_error, 0.05);
        assert_eq!(config.sigma_level, 2);
        assert!(!config.plot);
        assert_eq!(config.concordia.t_max_ma, 3000.0);
        assert_eq!(config.concordia.tick_ages_ma.len(), 8);
    }

    #[test]
    fn sample_noise_is_a_fraction() {
        let cli = Cli::parse_from(["geochron", "sample", "--age", "500", "--noise", "2"]);
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        let config = sample_config_from_args(&args);
        assert_eq!(config.noise, 0.02);
        assert_eq!(config.count, 20);
        assert_eq!(config.seed, 42);
    }
}
