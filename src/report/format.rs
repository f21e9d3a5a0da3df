//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::BatchResult;
use crate::decay::IsotopicSystem;
use crate::domain::{AgeEstimate, CurveFile, DirectAge};
use crate::io::ingest::{IngestedBatch, printable_delimiter};

/// Row errors listed before the output switches to a count.
const MAX_LISTED_ROW_ERRORS: usize = 10;

/// Table of the supported isotopic systems.
pub fn format_systems_table(systems: &[IsotopicSystem]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<14} {:>16} {:>14} {:<24}",
            "system", "reaction", "half-life (a)", "lambda (1/a)", "source"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<16} {:-<14} {:-<24}", "", "", "", "", "").trim_end());
    out.push('\n');

    for s in systems {
        out.push_str(
            format!(
                "{:<12} {:<14} {:>16} {:>14} {:<24}",
                s.id,
                s.reaction,
                fmt_half_life(s.half_life_years),
                format!("{:.6e}", s.decay_constant),
                s.source
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Direct age with the intermediate decay-law values.
pub fn format_direct_age(result: &DirectAge) -> String {
    let est = &result.estimate;
    let mut out = String::new();
    out.push_str(&format!("System: {}\n", est.system));
    out.push_str(&format!("Half-life: {} years\n", fmt_half_life(result.half_life_years)));
    out.push_str(&format!("Decay constant λ (1/a): {:.6e}\n", est.decay_constant));
    out.push_str(&format!("n/(n+h): {:.6}\n", result.ratio));
    out.push_str(&format!("ln(n/(n+h)): {:.6}\n", result.log_ratio));
    out.push_str(&format!("Age: {:.2} Ma ({:.0} years)\n", est.age_ma, est.age_years));
    out
}

/// Input file summary: source, delimiter, rows used/skipped, data extent.
pub fn format_ingest_summary(ingest: &IngestedBatch) -> String {
    let mut out = String::new();

    out.push_str("=== geochron - U-Pb concordia batch ===\n");
    out.push_str(&format!(
        "Input: {} (delimiter '{}')\n",
        ingest.source.display(),
        printable_delimiter(ingest.delimiter)
    ));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    for e in ingest.row_errors.iter().take(MAX_LISTED_ROW_ERRORS) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if ingest.row_errors.len() > MAX_LISTED_ROW_ERRORS {
        out.push_str(&format!(
            "  ... and {} more\n",
            ingest.row_errors.len() - MAX_LISTED_ROW_ERRORS
        ));
    }
    out.push_str(&format!(
        "Points: n={} | x=[{:.6}, {:.6}] | y=[{:.6}, {:.6}]\n",
        ingest.stats.n_points, ingest.stats.x_min, ingest.stats.x_max, ingest.stats.y_min, ingest.stats.y_max
    ));

    out
}

/// Fit line, goodness of fit and average age for a batch.
pub fn format_batch_result(result: &BatchResult) -> String {
    let sigma = result.batch.sigma_level();
    let mut out = String::new();

    out.push_str(&format!(
        "Relative error: {:.2} % | sigma level: {sigma}σ\n",
        result.batch.relative_error() * 100.0
    ));

    out.push_str("\nLinear fit (y = slope · x + intercept):\n");
    out.push_str(&format!("- slope    : {:.6}\n", result.fit.slope));
    out.push_str(&format!("- intercept: {:.6}\n", result.fit.intercept));

    out.push_str("\nGoodness of fit:\n");
    match (&result.goodness, &result.goodness_note) {
        (Some(gof), _) => out.push_str(&format!(
            "- MSWD = {:.3} | p-value = {:.3} | dof = {}\n",
            gof.mswd, gof.p_value, gof.degrees_of_freedom
        )),
        (None, Some(reason)) => out.push_str(&format!("- MSWD undefined: {reason}\n")),
        (None, None) => out.push_str("- MSWD undefined\n"),
    }

    let age = &result.age;
    out.push_str(&format!(
        "\nAverage age ({}, λ = {:.6e} 1/a):\n",
        age.system, age.decay_constant
    ));
    out.push_str(&format!("- {}\n", fmt_age(age)));
    if let Some(u) = age.scaled_uncertainty_ma(sigma).filter(|_| sigma > 1) {
        out.push_str(&format!("- at {sigma}σ: ± {u:.1} Ma\n"));
    }

    out
}

/// Header printed above a re-plotted curve file.
pub fn format_curve_file_summary(file: &CurveFile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Curve: {} vs {} | 0-{} Ma | {} points | generated {} by {}\n",
        file.system_y,
        file.system_x,
        file.t_max_ma,
        file.curve.points.len(),
        file.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        file.tool
    ));
    if let Some(batch) = &file.batch {
        out.push_str(&format!("Batch: n={}", batch.points.len()));
        if let Some(gof) = &batch.goodness {
            out.push_str(&format!(" | MSWD = {:.3} | p-value = {:.3}", gof.mswd, gof.p_value));
        }
        out.push_str(&format!(" | age = {}\n", fmt_age(&batch.age)));
    }
    out
}

/// Age with its 1σ uncertainty when one exists.
fn fmt_age(age: &AgeEstimate) -> String {
    match age.uncertainty_ma {
        Some(u) => format!("{:.1} ± {:.1} Ma (1σ)", age.age_ma, u),
        None => format!("{:.1} Ma", age.age_ma),
    }
}

/// Half-lives span 5730 to 1.06e11 years; plain digits stay readable up to ~1e12.
fn fmt_half_life(v: f64) -> String {
    let digits = format!("{v:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}
