//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a CI log
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly totals: `o` markers joined by a `.` line
//! - category averages: `#` bars annotated with the value (2 decimals)
//! - yearly split: `R` (registered) / `c` (casual) proportion bar

use crate::domain::{PeriodTotals, YearSplit};

/// Render the monthly trend line.
pub fn render_trend(monthly: &[PeriodTotals], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return "No rentals in the selected range.\n".to_string();
    };

    let values: Vec<f64> = monthly.iter().map(|m| m.total as f64).collect();
    let (y_min, y_max) = value_range(&values);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = (values.len() - 1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    let cells: Vec<(usize, usize)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (map_x(i as f64, x_max, width), map_y(v, y_min, y_max, height)))
        .collect();

    // Line first, so markers overlay it.
    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1], '.');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let first_label = first.period.format("%Y-%m").to_string();
    let last_label = last.period.format("%Y-%m").to_string();

    let mut out = String::new();
    out.push_str(&format!(
        "Monthly total rentals | {first_label} .. {last_label} | y=[{y_min:.1}, {y_max:.1}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    // Axis labels under the first and last columns when they fit.
    let gap = width.saturating_sub(first_label.len() + last_label.len());
    if gap >= 1 {
        out.push_str(&format!("{first_label}{}{last_label}\n", " ".repeat(gap)));
    }

    out
}

/// Render horizontal bars for `(label, value)` rows, in the given order.
pub fn render_bars(rows: &[(String, f64)], width: usize) -> String {
    if rows.is_empty() {
        return "No rentals in the selected range.\n".to_string();
    }

    let label_w = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + 12).max(10);
    let top = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);

    let mut out = String::new();
    for (label, value) in rows {
        let n = if top > 0.0 {
            ((value / top) * bar_w as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!("{label:<label_w$} |{} {value:.2}\n", "#".repeat(n.min(bar_w))));
    }
    out
}

/// Render one registered/casual proportion bar per year.
pub fn render_split(years: &[YearSplit], width: usize) -> String {
    if years.is_empty() {
        return "No rentals in the dataset.\n".to_string();
    }

    let bar_w = width.saturating_sub(46).max(10);
    let mut out = String::new();
    for y in years {
        if y.total() == 0 {
            out.push_str(&format!("{}  (no rentals)\n", y.year));
            continue;
        }
        let registered = ((y.registered_share() * bar_w as f64).round() as usize).min(bar_w);
        out.push_str(&format!(
            "{}  [{}{}]  Registered {:>5.1}%  Casual {:>5.1}%\n",
            y.year,
            "R".repeat(registered),
            "c".repeat(bar_w - registered),
            y.registered_share() * 100.0,
            y.casual_share() * 100.0,
        ));
    }
    out
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    if x_max <= 0.0 {
        return 0;
    }
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Largest value on row 0.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid.get_mut(y0 as usize).and_then(|row| row.get_mut(x0 as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
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
