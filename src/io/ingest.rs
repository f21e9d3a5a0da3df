//! CSV ingest and normalization.
//!
//! This module turns a user-supplied ratio CSV into a validated
//! `MeasurementBatch`. Inputs in the wild come from spreadsheets with
//! different locales, so we:
//!
//! - sniff the delimiter (`;`, `,`, `|`, tab) from the first 1 KiB
//! - normalize header names (trim, strip BOM/quotes/spaces, lowercase)
//! - accept decimal commas (`0,0153`)
//! - skip unparseable rows but report what happened
//!
//! No fitting logic lives here.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{BatchConfig, MeasurementBatch, RatioPoint};
use crate::error::AppError;

/// Delimiters considered by the sniffer, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 4] = [b';', b',', b'|', b'\t'];

/// Bytes inspected when sniffing the delimiter.
const SNIFF_BYTES: usize = 1024;

/// Accepted header names for the 207Pb/235U column.
const X_COLUMNS: [&str; 2] = ["x", "pb207_pb235"];

/// Accepted header names for the 206Pb/238U column.
const Y_COLUMNS: [&str; 2] = ["y", "pb206_pb238"];

/// Summary stats about the points actually used.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed ratio table before batch settings are applied.
#[derive(Debug, Clone)]
pub struct RatioTable {
    pub points: Vec<RatioPoint>,
    pub delimiter: u8,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Ingest output: validated batch + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub source: PathBuf,
    pub batch: MeasurementBatch,
    pub delimiter: u8,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the CSV named in `config` and build a measurement batch from it.
pub fn load_batch(config: &BatchConfig) -> Result<IngestedBatch, AppError> {
    let table = load_ratio_csv(&config.csv_path)?;

    let batch = MeasurementBatch::from_points(&table.points, config.relative_error, config.sigma_level)?;
    let stats = compute_stats(&table.points)
        .ok_or_else(|| AppError::new(3, "No valid points remain after parsing."))?;

    let rows_used = table.points.len();
    info!(
        path = %config.csv_path.display(),
        delimiter = %printable_delimiter(table.delimiter),
        rows_read = table.rows_read,
        rows_used,
        "loaded ratio CSV"
    );

    Ok(IngestedBatch {
        source: config.csv_path.clone(),
        batch,
        delimiter: table.delimiter,
        stats,
        row_errors: table.row_errors,
        rows_read: table.rows_read,
        rows_used,
    })
}

/// Read and parse a ratio CSV file.
pub fn load_ratio_csv(path: &Path) -> Result<RatioTable, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_ratio_csv(&text)
}

/// Parse ratio CSV text (delimiter sniffed, headers normalized).
pub fn parse_ratio_csv(text: &str) -> Result<RatioTable, AppError> {
    let delimiter = sniff_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let x_idx = resolve_column(&header_map, &X_COLUMNS);
    let y_idx = resolve_column(&header_map, &Y_COLUMNS);

    let (x_idx, y_idx) = match (x_idx, y_idx) {
        (Some(x), Some(y)) => (x, y),
        (x, y) => {
            let mut missing = Vec::new();
            if x.is_none() {
                missing.push("`x`");
            }
            if y.is_none() {
                missing.push("`y`");
            }
            return Err(AppError::new(
                2,
                format!(
                    "Missing required column(s): {}. The CSV needs an `x` (207Pb/235U) and a `y` (206Pb/238U) column.",
                    missing.join(", ")
                ),
            ));
        }
    };

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: header is line 1, records() is 0-based.
        let fallback_line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rows_read += 1;
                row_errors.push(RowError {
                    line: e.position().map_or(fallback_line, |p| p.line() as usize),
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);

        // Trailing blank lines in spreadsheet exports.
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows_read += 1;

        // Decimal commas in a comma-delimited file split values across fields.
        if record.len() != headers.len() {
            let message = format!("expected {} fields, got {}", headers.len(), record.len());
            warn!(line, %message, "skipping CSV row");
            row_errors.push(RowError { line, message });
            continue;
        }

        match parse_row(&record, x_idx, y_idx) {
            Ok(point) => points.push(point),
            Err(message) => {
                warn!(line, %message, "skipping CSV row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if points.is_empty() {
        return Err(AppError::new(3, "No valid rows found in CSV."));
    }

    Ok(RatioTable {
        points,
        delimiter,
        row_errors,
        rows_read,
    })
}

/// Pick the delimiter from the first `SNIFF_BYTES` of the file.
///
/// A candidate qualifies when it appears in the header line and every sampled
/// data line has the same count. Among qualifiers the highest count wins, with
/// ties broken by `DELIMITER_CANDIDATES` order. Falls back to the candidate
/// most frequent in the header, then to `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let end = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= SNIFF_BYTES)
        .unwrap_or(text.len());
    let sample = &text[..end];

    let mut lines = sample.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return b',';
    };
    // The last sampled line may be cut mid-row.
    let mut rows: Vec<&str> = lines.collect();
    if end < text.len() {
        rows.pop();
    }

    let count = |line: &str, d: u8| line.bytes().filter(|&b| b == d).count();

    let mut best: Option<(u8, usize)> = None;
    for &d in &DELIMITER_CANDIDATES {
        let n = count(header, d);
        if n == 0 || !rows.iter().all(|row| count(row, d) == n) {
            continue;
        }
        if best.is_none_or(|(_, best_n)| n > best_n) {
            best = Some((d, n));
        }
    }
    if let Some((d, _)) = best {
        return d;
    }

    DELIMITER_CANDIDATES
        .iter()
        .map(|&d| (d, count(header, d)))
        .filter(|&(_, n)| n > 0)
        .fold(None, |acc: Option<(u8, usize)>, (d, n)| match acc {
            Some((_, best_n)) if best_n >= n => acc,
            _ => Some((d, n)),
        })
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

/// Trim, drop a UTF-8 BOM, remove quotes and spaces, lowercase.
pub fn normalize_header_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ' '))
        .collect::<String>()
        .to_lowercase()
}

fn resolve_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| header_map.get(*name).copied())
}

fn parse_row(record: &StringRecord, x_idx: usize, y_idx: usize) -> Result<RatioPoint, String> {
    let x = parse_decimal(record.get(x_idx)).map_err(|e| format!("column `x`: {e}"))?;
    let y = parse_decimal(record.get(y_idx)).map_err(|e| format!("column `y`: {e}"))?;
    Ok(RatioPoint { x, y })
}

/// Parse a number that may use a decimal comma.
pub fn parse_decimal(raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or("missing value")?;
    let normalized = raw.replace(',', ".");
    let v = normalized
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{raw}' is not finite"))
    }
}

fn compute_stats(points: &[RatioPoint]) -> Option<DatasetStats> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_points: points.len(),
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

/// Human-readable delimiter for logs and reports.
pub fn printable_delimiter(d: u8) -> String {
    match d {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolon_with_decimal_commas() {
        let text = "x;y\n0,10;0,015\n0,12;0,017\n";
        assert_eq!(sniff_delimiter(text), b';');
    }

    #[test]
    fn sniffs_comma_tab_and_pipe() {
        assert_eq!(sniff_delimiter("x,y\n0.1,0.2\n"), b',');
        assert_eq!(sniff_delimiter("x\ty\n0.1\t0.2\n"), b'\t');
        assert_eq!(sniff_delimiter("x|y\n0.1|0.2\n"), b'|');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header_name("\u{feff} 'X' "), "x");
        assert_eq!(normalize_header_name("\"Pb206_Pb238\""), "pb206_pb238");
        assert_eq!(normalize_header_name("Y value"), "yvalue");
    }

    #[test]
    fn parses_decimal_comma_values() {
        assert_eq!(parse_decimal(Some(" 0,0153 ")).unwrap(), 0.0153);
        assert_eq!(parse_decimal(Some("1.5")).unwrap(), 1.5);
        assert!(parse_decimal(Some("abc")).is_err());
        assert!(parse_decimal(Some("")).is_err());
        assert!(parse_decimal(None).is_err());
        assert!(parse_decimal(Some("inf")).is_err());
    }

    #[test]
    fn parses_semicolon_file_with_quoted_headers() {
        let text = "\"X\";\"Y\"\n0,10;0,015\n0,12;0,017\n0,11;0,016\n";
        let table = parse_ratio_csv(text).unwrap();
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.points.len(), 3);
        assert_eq!(table.points[1], RatioPoint { x: 0.12, y: 0.017 });
        assert!(table.row_errors.is_empty());
    }

    #[test]
    fn resolves_isotope_alias_headers() {
        let text = "Sample,Pb207_Pb235,Pb206_Pb238\nA,0.5,0.06\nB,0.6,0.07\n";
        let table = parse_ratio_csv(text).unwrap();
        assert_eq!(table.points, vec![RatioPoint { x: 0.5, y: 0.06 }, RatioPoint { x: 0.6, y: 0.07 }]);
    }

    #[test]
    fn missing_column_is_rejected() {
        let err = parse_ratio_csv("x,z\n0.1,0.2\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`y`"));
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        let text = "x,y\n0.1,0.2\nfoo,0.3\n0.3,\n0.4,0.5\n\n";
        let table = parse_ratio_csv(text).unwrap();
        assert_eq!(table.points.len(), 2);
        assert_eq!(table.rows_read, 4);
        let lines: Vec<usize> = table.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn row_error_lines_account_for_blank_lines() {
        let table = parse_ratio_csv("x,y\n0.1,0.2\n\nbad,0.3\n").unwrap();
        assert_eq!(table.row_errors.len(), 1);
        assert_eq!(table.row_errors[0].line, 4);
    }

    #[test]
    fn rows_with_extra_fields_are_rejected() {
        let text = "x,y\n0.10,0.015\n0,12,0,017\n0.11,0.016\n0.13\n";
        let table = parse_ratio_csv(text).unwrap();
        assert_eq!(table.points, vec![RatioPoint { x: 0.10, y: 0.015 }, RatioPoint { x: 0.11, y: 0.016 }]);
        assert_eq!(table.rows_read, 4);
        let errors: Vec<(usize, &str)> = table.row_errors.iter().map(|e| (e.line, e.message.as_str())).collect();
        assert_eq!(errors, vec![(3, "expected 2 fields, got 4"), (5, "expected 2 fields, got 1")]);
    }

    #[test]
    fn comma_file_with_decimal_commas_is_not_misread() {
        let err = parse_ratio_csv("x,y\n0,10,0,015\n0,12,0,017\n0,11,0,016\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let err = parse_ratio_csv("x,y\nfoo,bar\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
