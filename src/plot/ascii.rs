//! ASCII log-log plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Both axes are logarithmic. Plot elements:
//! - observed prices: `o`
//! - central fit: `-` line
//! - channel boundaries: `=` lines

use crate::domain::{ChannelCurves, CurveFile};

/// Render observed points plus fit/channel curves.
///
/// `observed` is `(day_index, price)`; non-positive values are skipped since
/// they have no place on log axes.
pub fn render_ascii_plot(observed: &[(f64, f64)], curves: &ChannelCurves, width: usize, height: usize) -> String {
    render_plot(observed, Some(curves), width, height)
}

/// Render a plot from a saved curve JSON file (curves only, no overlay points).
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    render_plot(&[], Some(&curve.grid), width, height)
}

fn render_plot(observed: &[(f64, f64)], curves: Option<&ChannelCurves>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let observed: Vec<(f64, f64)> = observed
        .iter()
        .copied()
        .filter(|&(x, y)| x > 0.0 && y > 0.0 && x.is_finite() && y.is_finite())
        .collect();

    let (x_min, x_max) = x_range(&observed, curves).unwrap_or((1.0, 10.0));
    let (y_min, y_max) = y_range(&observed, curves).unwrap_or((1.0, 10.0));
    let (y_min, y_max) = pad_log_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay); the central fit wins over channel lines.
    if let Some(curves) = curves {
        let bounds = Bounds { x_min, x_max, y_min, y_max };
        draw_curve(&mut grid, &curves.day_index, &curves.central, &bounds, '-');
        draw_curve(&mut grid, &curves.day_index, &curves.upper, &bounds, '=');
        draw_curve(&mut grid, &curves.day_index, &curves.lower, &bounds, '=');
    }

    for &(x, y) in &observed {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot (log-log): day=[{x_min:.0}, {x_max:.0}] | price=[{y_min:.2}, {y_max:.2}] USD\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

fn x_range(observed: &[(f64, f64)], curves: Option<&ChannelCurves>) -> Option<(f64, f64)> {
    let curve_days = curves.map(|c| c.day_index.as_slice()).unwrap_or(&[]);
    positive_range(observed.iter().map(|&(x, _)| x).chain(curve_days.iter().copied()))
}

fn y_range(observed: &[(f64, f64)], curves: Option<&ChannelCurves>) -> Option<(f64, f64)> {
    let curve_values = curves
        .into_iter()
        .flat_map(|c| c.central.iter().chain(c.upper.iter()).chain(c.lower.iter()))
        .copied();
    positive_range(observed.iter().map(|&(_, y)| y).chain(curve_values))
}

fn positive_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite() && *v > 0.0) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

/// Pad a positive range by `frac` of its span in log space.
fn pad_log_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max.ln() - min.ln()).abs();
    let pad = (span * frac).max(1e-12);
    ((min.ln() - pad).exp(), (max.ln() + pad).exp())
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x.ln() - x_min.ln()) / (x_max.ln() - x_min.ln())).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y.ln() - y_min.ln()) / (y_max.ln() - y_min.ln())).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], xs: &[f64], ys: &[f64], b: &Bounds, ch: char) {
    if xs.len() < 2 || xs.len() != ys.len() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (&x, &y) in xs.iter().zip(ys) {
        if !(x > 0.0 && y > 0.0 && x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, b.x_min, b.x_max, width);
        let row = map_y(y, b.y_min, b.y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, ch);
        } else if grid[row][col] == ' ' {
            grid[row][col] = ch;
        }
        prev = Some((col, row));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        // Flat fit at 10 with channel at 1 and 100, over days 1..1000.
        let curves = ChannelCurves {
            day_index: vec![1.0, 1000.0],
            central: vec![10.0, 10.0],
            upper: vec![100.0, 100.0],
            lower: vec![1.0, 1.0],
        };
        let observed = [(1.0, 10.0), (1000.0, 100.0)];

        let txt = render_ascii_plot(&observed, &curves, 10, 5);
        let expected = concat!(
            "Plot (log-log): day=[1, 1000] | price=[0.79, 125.89] USD\n",
            "=========o\n",
            "          \n",
            "o---------\n",
            "          \n",
            "==========\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn non_positive_points_are_skipped() {
        let curves = ChannelCurves {
            day_index: vec![1.0, 10.0],
            central: vec![1.0, 10.0],
            upper: vec![2.0, 20.0],
            lower: vec![0.5, 5.0],
        };
        let txt = render_ascii_plot(&[(0.0, 5.0), (5.0, -1.0)], &curves, 20, 6);
        assert!(txt.lines().skip(1).all(|l| !l.contains('o')));
        assert_eq!(txt.lines().count(), 7);
    }
}
