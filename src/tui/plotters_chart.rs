//! Plotters-powered monthly trend widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`. Tick labels are drawn by the caller as plain
//! Ratatui text, which reads better than Plotters fonts at terminal resolution.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::TREND_RGB;

/// Render-only description of the trend chart; all data prep happens outside `render`.
pub struct TrendChart<'a> {
    /// `(month index, total rentals)` per month.
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).margin(1).build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(0)
                .axis_style(&WHITE)
                .draw()?;

            let (r, g, b) = TREND_RGB;
            let color = RGBColor(r, g, b);
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a pixel reads as a marker.
            chart.draw_series(self.points.iter().map(|&p| Pixel::new(p, WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
