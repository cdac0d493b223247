//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - the series: `-` line, in index order
//! - anomalies: `^` (anomalously high), `v` (anomalously low)

use crate::domain::{Anomalies, DetectionReport};

/// Render a series with its anomalies marked.
pub fn render_ascii_plot(series: &[f64], anomalies: &Anomalies, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_max = series.len().saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = y_range(series);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let points: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, &y)| (map_x(i as f64, x_max, width), map_y(y, y_min, y_max, height)))
        .collect();
    draw_series(&mut grid, &points);

    // Markers overwrite the line.
    for (i, &(x, y)) in points.iter().enumerate() {
        if !anomalies.positions.get(i).copied().unwrap_or(false) {
            continue;
        }
        let up = anomalies.values.get(i).copied().unwrap_or(0.0) >= 0.0;
        grid[y][x] = if up { '^' } else { 'v' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: index=[0, {}] | y=[{y_min:.2}, {y_max:.2}] | anomalies={}\n",
        series.len().saturating_sub(1),
        anomalies.count(),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render a saved report, titled with its column.
pub fn render_report_plot(report: &DetectionReport, width: usize, height: usize) -> String {
    let mut out = format!("[{}]\n", report.column);
    out.push_str(&render_ascii_plot(&report.series, &report.anomalies, width, height));
    out
}

fn y_range(series: &[f64]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in series.iter().filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        (0.0, 1.0)
    } else if max_y > min_y {
        (min_y, max_y)
    } else {
        (min_y - 0.5, max_y + 0.5)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let u = (t / t_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], points: &[(usize, usize)]) {
    match points {
        [] => {}
        [(x, y)] => grid[*y][*x] = '-',
        _ => {
            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                draw_line(grid, x0, y0, x1, y1, '-');
            }
        }
    }
}

/// Integer line drawing (Bresenham-ish).
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn spiky() -> (Vec<f64>, Anomalies) {
        let series = vec![1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, -3.0, 1.0, 1.0];
        let mut anomalies = Anomalies::none(series.len());
        anomalies.positions[3] = true;
        anomalies.values[3] = 4.0;
        anomalies.positions[7] = true;
        anomalies.values[7] = -4.0;
        (series, anomalies)
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let (series, anomalies) = spiky();
        let txt = render_ascii_plot(&series, &anomalies, 10, 5);
        let expected = concat!(
            "Plot: index=[0, 9] | y=[-3.40, 5.40] | anomalies=2\n",
            "   ^      \n",
            "   --     \n",
            "--- --- --\n",
            "       -- \n",
            "       v  \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_sits_mid_plot() {
        let txt = render_ascii_plot(&[2.0; 4], &Anomalies::none(4), 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], "----------");
        assert!(rows.iter().enumerate().all(|(i, r)| i == 2 || r.trim().is_empty()));
    }

    #[test]
    fn report_plot_is_titled() {
        let (series, anomalies) = spiky();
        let report = DetectionReport {
            tool: "rpca".to_string(),
            column: "visits".to_string(),
            config: crate::domain::RpcaConfig::default(),
            decomposition: None,
            dates: None,
            series,
            anomalies,
        };
        let txt = render_report_plot(&report, 10, 5);
        assert!(txt.starts_with("[visits]\nPlot: index=[0, 9]"));
    }
}
