//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid; the same input always yields the same text.
//!
//! Plot elements:
//! - monthly values: `o`
//! - connecting line: `-`
//! - optional highlight of the best month: `*`

use chrono::NaiveDate;

use crate::domain::{Measure, month_label};
use crate::plot::pad_range;

/// Render a monthly series as a line plot.
pub fn render_ascii_trend(
    series: &[(NaiveDate, f64)],
    measure: Measure,
    width: usize,
    height: usize,
    highlight_best: bool,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if series.is_empty() {
        return format!("Plot: no {} data\n", measure.label());
    }

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let n = series.len();
    let points: Vec<(usize, usize)> = series
        .iter()
        .enumerate()
        .map(|(i, &(_, v))| (map_x(i, n, width), map_y(v, y_min, y_max, height)))
        .collect();

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first so markers overlay it.
    for w in points.windows(2) {
        draw_line(&mut grid, w[0].0, w[0].1, w[1].0, w[1].1, '-');
    }

    let best = if highlight_best { best_index(series) } else { None };
    for (i, &(x, y)) in points.iter().enumerate() {
        grid[y][x] = if Some(i) == best { '*' } else { 'o' };
    }

    let first = month_label(series[0].0);
    let last = month_label(series[n - 1].0);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: month=[{first}, {last}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        measure.label()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn best_index(series: &[(NaiveDate, f64)]) -> Option<usize> {
    series
        .iter()
        .enumerate()
        .filter(|(_, (_, v))| v.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, &(_, v))| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

fn y_range(series: &[(NaiveDate, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, v) in series {
        if v.is_finite() {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = if y.is_finite() {
        ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
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
