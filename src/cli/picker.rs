//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `geochron concordia` and choose a CSV" UX
//!
//! The picker searches for `*.csv` files under the current working directory.
//! `GEOCHRON_SEARCH_DEPTH` overrides the recursion depth.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Environment variable overriding the recursion depth.
pub const SEARCH_DEPTH_ENV: &str = "GEOCHRON_SEARCH_DEPTH";

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Provide one with `geochron concordia -f <file.csv>`.",
        ));
    }
    let stdin = io::stdin();
    select_csv(&files, &mut stdin.lock(), &mut io::stdout())
}

/// Selection loop over an already-discovered file list.
pub fn select_csv<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, output: &mut W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(output, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(output, "Select a file by number (1-{}) or type a path (q to quit): ", files.len())
            .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a CSV path with `geochron concordia -f <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(write_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => {
                writeln!(output, "{err}").map_err(write_err)?;
                continue;
            }
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!(
                "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
                path.display()
            ),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), search_depth())
}

/// Recursion depth from `GEOCHRON_SEARCH_DEPTH`, or the default.
pub fn search_depth() -> usize {
    match env::var(SEARCH_DEPTH_ENV) {
        Ok(raw) => parse_search_depth(&raw).unwrap_or_else(|| {
            warn!(value = %raw, default = DEFAULT_SEARCH_DEPTH, "ignoring invalid {SEARCH_DEPTH_ENV}");
            DEFAULT_SEARCH_DEPTH
        }),
        Err(_) => DEFAULT_SEARCH_DEPTH,
    }
}

fn parse_search_depth(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_csv_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("top.csv"), "x,y\n").unwrap();
        fs::write(dir.path().join("a/b/deep.CSV"), "x,y\n").unwrap();
        fs::write(dir.path().join("target/skip.csv"), "x,y\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        dir
    }

    #[test]
    fn discovery_respects_depth_and_skips_build_dirs() {
        let dir = tree();
        let all = find_csv_files(dir.path(), 4);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| !p.to_string_lossy().contains("target")));

        let shallow = find_csv_files(dir.path(), 1);
        assert_eq!(shallow.len(), 1);
        assert!(shallow[0].ends_with("top.csv"));
    }

    #[test]
    fn search_depth_parsing() {
        assert_eq!(parse_search_depth(" 2 "), Some(2));
        assert_eq!(parse_search_depth("deep"), None);
        assert_eq!(parse_search_depth("-1"), None);
    }

    #[test]
    fn selection_reprompts_then_accepts_number() {
        let dir = tree();
        let files = find_csv_files(dir.path(), 4);
        let mut input = Cursor::new("7\nnope.csv\n2\n");
        let mut output = Vec::new();

        let picked = select_csv(&files, &mut input, &mut output).unwrap();
        assert_eq!(picked, files[1]);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Invalid choice: 7"));
        assert!(printed.contains("CSV file not found: nope.csv"));
    }

    #[test]
    fn selection_can_be_canceled() {
        let files = vec![PathBuf::from("a.csv")];
        let err = select_csv(&files, &mut Cursor::new("q\n"), &mut Vec::new()).unwrap_err();
        assert_eq!(err.message(), "Canceled.");

        let err = select_csv(&files, &mut Cursor::new(""), &mut Vec::new()).unwrap_err();
        assert!(err.message().starts_with("No input received"));
    }

    #[test]
    fn validate_rejects_non_csv() {
        let dir = tree();
        let err = validate_csv_path(&dir.path().join("notes.txt")).unwrap_err();
        assert!(err.message().starts_with("Expected a .csv file"));
        let err = validate_csv_path(dir.path()).unwrap_err();
        assert!(err.message().starts_with("Expected a file"));
    }
}
