//! ASCII concordia plot for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - concordia curve: `-`
//! - fitted line: `.`
//! - age ticks: `+` followed by the age in Ma
//! - observed points: `o`, with `=` / `|` bars spanning ±kσ

use crate::domain::{ConcordiaCurve, CurveFile, PlotZoom, RatioPoint};

/// Axis ranges of the plot, in ratio units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Per-point uncertainty drawn around each marker.
///
/// Each bar spans `±sigma_level · |v| · relative_error` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBars {
    pub relative_error: f64,
    pub sigma_level: u32,
}

impl ErrorBars {
    fn half_width(&self, v: f64) -> f64 {
        f64::from(self.sigma_level) * v.abs() * self.relative_error
    }
}

/// Render the concordia with optional data points, error bars and fit line.
///
/// `fit` is `(slope, intercept)` of `y = slope · x + intercept`.
pub fn render_concordia_plot(
    curve: &ConcordiaCurve,
    points: &[RatioPoint],
    errors: Option<ErrorBars>,
    fit: Option<(f64, f64)>,
    zoom: PlotZoom,
    width: usize,
    height: usize,
) -> String {
    let window = plot_window(curve, points, zoom);
    render_in_window(curve, points, errors, fit, window, width, height)
}

/// Render a saved concordia file, including its batch overlay if present.
pub fn render_curve_file(file: &CurveFile, zoom: PlotZoom, width: usize, height: usize) -> String {
    match &file.batch {
        Some(batch) => render_concordia_plot(
            &file.curve,
            &batch.points,
            Some(ErrorBars {
                relative_error: batch.relative_error,
                sigma_level: batch.sigma_level,
            }),
            Some((batch.slope, batch.intercept)),
            zoom,
            width,
            height,
        ),
        None => render_concordia_plot(&file.curve, &[], None, None, PlotZoom::Curve, width, height),
    }
}

/// Pick the plot window.
///
/// `Data` pads the point extent by 5 % of each bound's magnitude and falls
/// back to `Curve` when there are no points.
pub fn plot_window(curve: &ConcordiaCurve, points: &[RatioPoint], zoom: PlotZoom) -> PlotWindow {
    if zoom == PlotZoom::Data {
        if let Some((x0, x1, y0, y1)) = extent(points.iter().map(|p| (p.x, p.y))) {
            let (x_min, x_max) = widen(x0, x1);
            let (y_min, y_max) = widen(y0, y1);
            return PlotWindow { x_min, x_max, y_min, y_max };
        }
    }

    let all = curve
        .points
        .iter()
        .map(|p| (p.x, p.y))
        .chain(points.iter().map(|p| (p.x, p.y)));
    let (x0, x1, y0, y1) = extent(all).unwrap_or((0.0, 1.0, 0.0, 1.0));
    let (x_min, x_max) = pad_range(x0, x1, 0.05);
    let (y_min, y_max) = pad_range(y0, y1, 0.05);
    PlotWindow { x_min, x_max, y_min, y_max }
}

/// Render into an explicit window.
pub fn render_in_window(
    curve: &ConcordiaCurve,
    points: &[RatioPoint],
    errors: Option<ErrorBars>,
    fit: Option<(f64, f64)>,
    window: PlotWindow,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers can overlay.
    let curve_xy: Vec<(f64, f64)> = curve.points.iter().map(|p| (p.x, p.y)).collect();
    draw_function(&mut grid, &window, '-', |x| interpolate(&curve_xy, x));
    if let Some((slope, intercept)) = fit {
        draw_function(&mut grid, &window, '.', |x| Some(slope * x + intercept));
    }

    for tick in &curve.ticks {
        let (Some(col), Some(row)) = (map_x(tick.x, &window, width), map_y(tick.y, &window, height)) else {
            continue;
        };
        grid[row][col] = '+';
        let label = format!("{}", tick.age_ma);
        for (i, ch) in label.chars().enumerate() {
            let c = col + 1 + i;
            if c < width && grid[row][c] == ' ' {
                grid[row][c] = ch;
            }
        }
    }

    for p in points {
        let (Some(col), Some(row)) = (map_x(p.x, &window, width), map_y(p.y, &window, height)) else {
            continue;
        };
        if let Some(bars) = errors {
            let hx = bars.half_width(p.x);
            let hy = bars.half_width(p.y);
            let lo = map_x((p.x - hx).max(window.x_min), &window, width).unwrap_or(col);
            let hi = map_x((p.x + hx).min(window.x_max), &window, width).unwrap_or(col);
            for c in lo..=hi {
                if grid[row][c] == ' ' {
                    grid[row][c] = '=';
                }
            }
            // Rows grow downwards.
            let top = map_y((p.y + hy).min(window.y_max), &window, height).unwrap_or(row);
            let bottom = map_y((p.y - hy).max(window.y_min), &window, height).unwrap_or(row);
            for r in top..=bottom {
                if grid[r][col] == ' ' {
                    grid[r][col] = '|';
                }
            }
        }
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Concordia: x(207Pb/235U)=[{:.4}, {:.4}] | y(206Pb/238U)=[{:.4}, {:.4}]\n",
        window.x_min, window.x_max, window.y_min, window.y_max
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Trace `f` column by column, joining neighbouring columns with line segments.
fn draw_function(grid: &mut [Vec<char>], window: &PlotWindow, ch: char, f: impl Fn(f64) -> Option<f64>) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for col in 0..width {
        let u = col as f64 / (width as f64 - 1.0);
        let x = window.x_min + u * (window.x_max - window.x_min);
        let row = f(x).and_then(|y| map_y(y, window, height));

        match (prev, row) {
            (Some((c0, r0)), Some(r1)) => draw_line(grid, c0, r0, col, r1, ch),
            (None, Some(r1)) => {
                if grid[r1][col] == ' ' {
                    grid[r1][col] = ch;
                }
            }
            _ => {}
        }
        prev = row.map(|r| (col, r));
    }
}

/// Linear interpolation on a curve sorted by strictly increasing x.
fn interpolate(curve: &[(f64, f64)], x: f64) -> Option<f64> {
    let first = curve.first()?;
    let last = curve.last()?;
    if x < first.0 || x > last.0 {
        return None;
    }

    let idx = curve.partition_point(|&(cx, _)| cx < x);
    if idx == 0 {
        return Some(first.1);
    }
    let (x0, y0) = curve[idx - 1];
    let (x1, y1) = curve[idx];
    if x1 == x0 {
        return Some(y1);
    }
    Some(y0 + (x - x0) / (x1 - x0) * (y1 - y0))
}

fn extent(values: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64, f64, f64)> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (x, y) in values {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite() {
        Some((x_min, x_max, y_min, y_max))
    } else {
        None
    }
}

/// `[min · 0.95, max · 1.05]` generalized to any sign.
fn widen(min: f64, max: f64) -> (f64, f64) {
    let lo = min - 0.05 * min.abs();
    let hi = max + 0.05 * max.abs();
    if hi > lo { (lo, hi) } else { pad_range(min, max, 0.05) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, window: &PlotWindow, width: usize) -> Option<usize> {
    if !(x >= window.x_min && x <= window.x_max) {
        return None;
    }
    let u = (x - window.x_min) / (window.x_max - window.x_min);
    Some((u * (width as f64 - 1.0)).round() as usize)
}

fn map_y(y: f64, window: &PlotWindow, height: usize) -> Option<usize> {
    if !(y >= window.y_min && y <= window.y_max) {
        return None;
    }
    let u = (y - window.y_min) / (window.y_max - window.y_min);
    // y=top is max -> row 0
    Some((height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize)
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
