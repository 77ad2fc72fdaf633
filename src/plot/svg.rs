//! SVG chart export via Plotters.
//!
//! One file per chart:
//! - `monthly.svg`: monthly total rentals as a line with point markers
//! - `season.svg` / `weather.svg`: mean daily total per category, highest first,
//!   each bar annotated with its value (2 decimals)
//! - `yearly_split.svg`: one registered/casual pie per year
//!
//! Drawing errors are mapped to `AppError::runtime` at the `write_charts` boundary.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::app::pipeline::DashboardView;
use crate::domain::{
    CASUAL_RGB, CategoryAverage, PeriodTotals, REGISTERED_RGB, Season, TREND_RGB, Weather, YearSplit,
};
use crate::error::AppError;

type DrawResult = Result<(), Box<dyn Error>>;

const CHART_SIZE: (u32, u32) = (1024, 600);
const PIE_PANEL_WIDTH: u32 = 420;
const PIE_HEIGHT: u32 = 480;

/// Write every chart for `view` into `dir` (created if missing).
pub fn write_charts(dir: &Path, view: &DashboardView) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::runtime(format!("Failed to create {}: {e}", dir.display())))?;

    let monthly = dir.join("monthly.svg");
    let season = dir.join("season.svg");
    let weather = dir.join("weather.svg");
    let yearly = dir.join("yearly_split.svg");

    draw_monthly(&monthly, &view.monthly).map_err(|e| chart_error(&monthly, e))?;
    draw_bars(&season, "Average rentals by season", &category_bars(&view.by_season, Season::rgb))
        .map_err(|e| chart_error(&season, e))?;
    draw_bars(&weather, "Average rentals by weather", &category_bars(&view.by_weather, Weather::rgb))
        .map_err(|e| chart_error(&weather, e))?;
    draw_yearly_split(&yearly, &view.yearly).map_err(|e| chart_error(&yearly, e))?;

    tracing::info!(dir = %dir.display(), "wrote charts");
    Ok(vec![monthly, season, weather, yearly])
}

fn chart_error(path: &Path, err: Box<dyn Error>) -> AppError {
    AppError::runtime(format!("Failed to draw {}: {err}", path.display()))
}

/// `(label, value, color)` per bar, keeping the view's (descending) order.
fn category_bars<K: Copy + std::fmt::Display>(
    rows: &[CategoryAverage<K>],
    color: impl Fn(K) -> (u8, u8, u8),
) -> Vec<(String, f64, RGBColor)> {
    rows.iter()
        .map(|c| (c.key.to_string(), c.mean_total, rgb(color(c.key))))
        .collect()
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

fn draw_monthly(path: &Path, monthly: &[PeriodTotals]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let color = rgb(TREND_RGB);
    let x_max = monthly.len().saturating_sub(1).max(1) as f64;
    let y_max = monthly.iter().map(|m| m.total).max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly total rentals", ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.25..x_max + 0.25, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels(monthly.len().clamp(2, 12))
        .x_label_formatter(&|x| month_label(monthly, *x))
        .y_label_formatter(&|y| format!("{y:.0}"))
        .x_desc("Month")
        .y_desc("Total rentals")
        .draw()?;

    let points: Vec<(f64, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.total as f64))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
        .label("Total")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// `YYYY-MM` for an integral index, blank between months.
fn month_label(monthly: &[PeriodTotals], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    monthly
        .get(idx as usize)
        .map(|m| m.period.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn draw_bars(path: &Path, title: &str, bars: &[(String, f64, RGBColor)]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = bars.len().max(1) as f64;
    let top = bars.iter().map(|(_, v, _)| *v).fold(0.0, f64::max).max(1.0) * 1.15;
    // Room below zero for the category labels.
    let floor = -top * 0.08;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(10)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..n - 0.5, floor..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_label_formatter(&|y| if *y < 0.0 { String::new() } else { format!("{y:.0}") })
        .y_desc("Mean daily rentals")
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value, color))| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *value)], color.filled())
    }))?;

    let value_style = ("sans-serif", 20)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        bars.iter()
            .enumerate()
            .map(|(i, (_, value, _))| Text::new(format!("{value:.2}"), (i as f64, *value), value_style.clone())),
    )?;

    let label_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(
        bars.iter()
            .enumerate()
            .map(|(i, (label, _, _))| Text::new(label.clone(), (i as f64, floor / 2.0), label_style.clone())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_yearly_split(path: &Path, years: &[YearSplit]) -> DrawResult {
    let panels = years.len().max(1) as u32;
    let root = SVGBackend::new(path, (PIE_PANEL_WIDTH * panels, PIE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Registered vs casual rentals by year", ("sans-serif", 28))?;

    let registered = rgb(REGISTERED_RGB);
    let casual = rgb(CASUAL_RGB);
    let pct_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (panel, year) in root.split_evenly((1, panels as usize)).iter().zip(years) {
        let panel = panel.titled(&year.year.to_string(), ("sans-serif", 22))?;
        let (w, h) = panel.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2 - 10);
        let radius = (w.min(h) as f64 * 0.38).max(10.0);

        if year.total() == 0 {
            panel.draw(&Text::new("no rentals", center, pct_style.clone()))?;
            continue;
        }

        let slices = [
            ("Registered", year.registered_share(), registered),
            ("Casual", year.casual_share(), casual),
        ];
        let mut start = 90.0;
        for (_, share, color) in slices {
            if share <= 0.0 {
                continue;
            }
            let sweep = share * 360.0;
            panel.draw(&Polygon::new(wedge(center, radius, start, sweep), color.filled()))?;
            let mid = (start + sweep / 2.0).to_radians();
            let at = (
                center.0 + (radius * 0.6 * mid.cos()).round() as i32,
                center.1 - (radius * 0.6 * mid.sin()).round() as i32,
            );
            panel.draw(&Text::new(format!("{:.1}%", share * 100.0), at, pct_style.clone()))?;
            start += sweep;
        }

        // Legend under the pie.
        let legend_y = center.1 + radius as i32 + 24;
        for (i, (label, _, color)) in slices.iter().enumerate() {
            let x = 20 + i as i32 * (w as i32 / 2);
            panel.draw(&Rectangle::new([(x, legend_y - 6), (x + 12, legend_y + 6)], color.filled()))?;
            panel.draw(&Text::new(*label, (x + 18, legend_y - 8), ("sans-serif", 16).into_font()))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Polygon outline of a pie slice in pixel coordinates (y grows downward).
///
/// Angles are in degrees, counterclockwise from the positive x axis.
fn wedge(center: (i32, i32), radius: f64, start_deg: f64, sweep_deg: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep_deg.abs() / 2.0).ceil() as usize).max(1);
    let mut out = Vec::with_capacity(steps + 2);
    out.push(center);
    for i in 0..=steps {
        let angle = (start_deg + sweep_deg * i as f64 / steps as f64).to_radians();
        out.push((
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 - (radius * angle.sin()).round() as i32,
        ));
    }
    out
}
