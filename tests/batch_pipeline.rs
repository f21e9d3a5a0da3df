use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;

use geochron::app::pipeline::run_batch;
use geochron::data::generate_sample;
use geochron::domain::{BatchConfig, ConcordiaConfig, PlotZoom, SampleConfig};
use geochron::io::{build_curve_file, read_curve_json, write_curve_json, write_ratio_csv, write_results_csv};
use geochron::plot::render_curve_file;
use geochron::report::{format_batch_result, format_ingest_summary};

fn config_for(path: &Path) -> BatchConfig {
    BatchConfig {
        csv_path: path.to_path_buf(),
        relative_error: 0.02,
        sigma_level: 1,
        concordia: ConcordiaConfig::default(),
        plot: false,
        zoom: PlotZoom::Data,
        plot_width: 60,
        plot_height: 20,
        export_results: None,
        export_curve: None,
    }
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn semicolon_csv_with_decimal_commas_runs_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "spanish.csv",
        "\u{feff}\"X\";\"Y\"\n0,10;0,015\n0,12;0,017\nn/a;0,020\n0,11;0,016\n",
    );

    let run = run_batch(&config_for(&path)).unwrap();

    assert_eq!(run.ingest.delimiter, b';');
    assert_eq!(run.ingest.rows_read, 4);
    assert_eq!(run.ingest.rows_used, 3);
    assert_eq!(run.ingest.row_errors.len(), 1);
    assert_eq!(run.ingest.row_errors[0].line, 4);

    let result = &run.result;
    assert_abs_diff_eq!(result.fit.slope, 0.1, epsilon = 1e-9);
    assert_abs_diff_eq!(result.fit.intercept, 0.005, epsilon = 1e-9);

    let gof = result.goodness.unwrap();
    assert_eq!(gof.degrees_of_freedom, 1);
    assert!(gof.mswd.is_finite() && gof.mswd >= 0.0);
    assert!((0.0..=1.0).contains(&gof.p_value));

    assert_eq!(result.curve.points.len(), 500);
    assert_eq!(result.curve.ticks.len(), 8);

    let summary = format_ingest_summary(&run.ingest);
    assert!(summary.contains("delimiter ';'"));
    assert!(summary.contains("line 4: column `x`"));
    let report = format_batch_result(result);
    assert!(report.contains("MSWD = "));
    assert!(report.contains("Ma (1σ)"));
}

#[test]
fn missing_column_fails_with_input_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.csv", "x,z\n0.1,0.2\n");
    let err = run_batch(&config_for(&path)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn identical_x_values_fail_with_computation_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "flat.csv", "x,y\n0.1,0.015\n0.1,0.017\n0.1,0.016\n");
    let err = run_batch(&config_for(&path)).unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn single_row_is_insufficient_for_a_fit() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "one.csv", "x,y\n0.1,0.015\n");
    let err = run_batch(&config_for(&path)).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn synthetic_batch_recovers_its_age_and_survives_export() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("synthetic.csv");

    let sample = generate_sample(&SampleConfig {
        age_ma: 850.0,
        spread_ma: 0.0,
        count: 12,
        noise: 0.0,
        seed: 7,
    })
    .unwrap();
    write_ratio_csv(&csv_path, &sample.points).unwrap();

    let mut config = config_for(&csv_path);
    config.concordia = ConcordiaConfig {
        t_max_ma: 1500.0,
        resolution: 151,
        tick_ages_ma: vec![500.0, 1000.0],
    };

    // All points coincide, so the line is degenerate: use a spread instead.
    assert_eq!(run_batch(&config).unwrap_err().exit_code(), 4);

    let sample = generate_sample(&SampleConfig {
        age_ma: 850.0,
        spread_ma: 100.0,
        count: 12,
        noise: 0.0,
        seed: 7,
    })
    .unwrap();
    write_ratio_csv(&csv_path, &sample.points).unwrap();

    let run = run_batch(&config).unwrap();
    let mean_age: f64 = {
        let mean_y = sample.points.iter().map(|p| p.y).sum::<f64>() / 12.0;
        (1.0 + mean_y).ln() / geochron::decay::lookup("238U-206Pb").unwrap().decay_constant / 1e6
    };
    assert_abs_diff_eq!(run.result.age.age_ma, mean_age, epsilon = 1e-6);
    assert!((750.0..=950.0).contains(&run.result.age.age_ma));

    let results_path = dir.path().join("results.csv");
    write_results_csv(&results_path, &run.result.batch, &run.result.fit).unwrap();
    let results = fs::read_to_string(&results_path).unwrap();
    assert_eq!(results.lines().count(), 13);

    let curve_path = dir.path().join("curve.json");
    let file = build_curve_file(&run.result.curve, &config.concordia, Some(run.result.summary()));
    write_curve_json(&curve_path, &file).unwrap();

    let back = read_curve_json(&curve_path).unwrap();
    let batch = back.batch.as_ref().unwrap();
    assert_eq!(batch.points.len(), 12);
    assert_eq!(batch.slope, run.result.fit.slope);
    assert_eq!(back.curve.points.len(), 151);

    let plot = render_curve_file(&back, PlotZoom::Curve, 60, 20);
    assert_eq!(plot.lines().count(), 21);
    assert!(plot.contains('o'));
    assert!(plot.contains('-'));
}
