//! Ratatui-based terminal UI.
//!
//! The TUI shows the headline metrics, the monthly trend, the season and
//! weather averages and the per-year registered/casual split for a date range
//! that is edited from the keyboard. Every range change rebuilds the view
//! synchronously through `app::pipeline::build_view`.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph},
};

use crate::app::pipeline::{self, DashboardView};
use crate::domain::{CASUAL_RGB, CategoryAverage, DashboardConfig, DateRange, REGISTERED_RGB, Season, Weather};
use crate::error::AppError;
use crate::io::ingest::Dataset;

mod plotters_chart;
mod range_edit;

use plotters_chart::TrendChart;
use range_edit::{Bound, RangeEditor};

/// Where `e` writes the summary CSVs, relative to the working directory.
const EXPORT_DIR: &str = "exports";

/// Start the TUI.
///
/// The dataset is loaded before the terminal switches to the alternate
/// screen, so load errors print normally.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let dataset = crate::io::ingest::load_dataset(&config.data_path, config.totals_policy)?;
    let range = pipeline::resolve_range(dataset.span(), config.start, config.end)?;
    let mut app = App::new(dataset, config, range);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    dataset: Dataset,
    config: DashboardConfig,
    editor: RangeEditor,
    date_input: String,
    editing_date: bool,
    status: String,
    view: DashboardView,
}

impl App {
    fn new(dataset: Dataset, config: DashboardConfig, range: DateRange) -> Self {
        let editor = RangeEditor::new(dataset.span(), range);
        let view = pipeline::build_view(&dataset, editor.range());
        let status = match dataset.row_errors.len() {
            0 => format!("Loaded {} rows.", dataset.rows_read),
            n => format!("Loaded {} rows, skipped {n} (see log).", dataset.rows_read),
        };
        Self {
            dataset,
            config,
            editor,
            date_input: String::new(),
            editing_date: false,
            status,
            view,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.editor.select(Bound::Start),
            KeyCode::Down => self.editor.select(Bound::End),
            KeyCode::Left => self.change_range(|ed| ed.shift_days(-1)),
            KeyCode::Right => self.change_range(|ed| ed.shift_days(1)),
            KeyCode::PageUp => self.change_range(|ed| ed.shift_months(-1)),
            KeyCode::PageDown => self.change_range(|ed| ed.shift_months(1)),
            KeyCode::Char('a') => self.change_range(RangeEditor::reset),
            KeyCode::Enter => {
                self.editing_date = true;
                self.date_input = self.editor.selected_date().to_string();
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('e') => self.export(Path::new(EXPORT_DIR)),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim();
        match chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(date) => self.change_range(|ed| ed.set_selected(date)),
            Err(e) => self.status = format!("Invalid date '{trimmed}': {e}"),
        }
    }

    fn change_range(&mut self, edit: impl FnOnce(&mut RangeEditor)) {
        edit(&mut self.editor);
        let range = self.editor.range();
        if range != self.view.range {
            self.view = pipeline::build_view(&self.dataset, range);
        }
        self.status = format!("Range: {range} ({} record(s))", self.view.records_in_range);
    }

    fn export(&mut self, dir: &Path) {
        self.status = match crate::io::export::write_summaries(dir, &self.view) {
            Ok(paths) => format!("Wrote {} files to {}", paths.len(), dir.display()),
            Err(err) => {
                tracing::error!(%err, "export failed");
                format!("Export failed: {err}")
            }
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let file = self
            .config
            .data_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.config.data_path.display().to_string());

        let bound_style = |bound: Bound| {
            if self.editor.selected() == bound {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            }
        };
        let start_text = match (self.editing_date, self.editor.selected()) {
            (true, Bound::Start) => format!("{}_", self.date_input),
            _ => self.view.range.start().to_string(),
        };
        let end_text = match (self.editing_date, self.editor.selected()) {
            (true, Bound::End) => format!("{}_", self.date_input),
            _ => self.view.range.end().to_string(),
        };

        let m = &self.view.metrics;
        let lines = vec![
            Line::from(vec![
                Span::styled("Bike Rent Dashboard", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" | {file} | {} rows", self.dataset.records().len())),
            ]),
            Line::from(vec![
                Span::raw("Start: "),
                Span::styled(start_text, bound_style(Bound::Start)),
                Span::raw("   End: "),
                Span::styled(end_text, bound_style(Bound::End)),
                Span::styled(
                    format!("   ({} day(s), {} record(s))", self.view.range.days(), self.view.records_in_range),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(vec![
                Span::raw("Total: "),
                Span::styled(m.total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("   Registered: "),
                Span::styled(m.registered.to_string(), Style::default().fg(rgb(REGISTERED_RGB))),
                Span::raw("   Casual: "),
                Span::styled(m.casual.to_string(), Style::default().fg(rgb(CASUAL_RGB))),
            ]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(rows[1]);

        self.draw_trend(frame, rows[0]);
        draw_category_bars(frame, cols[0], "Avg by season", &self.view.by_season, Season::rgb);
        draw_category_bars(frame, cols[1], "Avg by weather", &self.view.by_weather, Weather::rgb);
        self.draw_yearly(frame, cols[2]);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Monthly total rentals").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = trend_series(&self.view) else {
            let msg = Paragraph::new("No rentals in the selected range.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendChart {
            points: &series.points,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &series);
        }
    }

    fn draw_yearly(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Registered vs casual").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.view.yearly.is_empty() {
            return;
        }
        let constraints = vec![Constraint::Length(3); self.view.yearly.len()];
        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (slot, year) in slots.iter().zip(&self.view.yearly) {
            let gauge = Gauge::default()
                .block(Block::default().title(year.year.to_string()))
                .gauge_style(Style::default().fg(rgb(REGISTERED_RGB)).bg(rgb(CASUAL_RGB)))
                .ratio(year.registered_share().clamp(0.0, 1.0))
                .label(format!(
                    "Registered {:.1}% / Casual {:.1}%",
                    year.registered_share() * 100.0,
                    year.casual_share() * 100.0
                ));
            frame.render_widget(gauge, *slot);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ start/end  ←/→ ±1 day  PgUp/PgDn ±1 month  Enter type date  a all  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Bars hold the mean scaled by 100 so heights keep the 2-decimal precision of the labels.
fn category_bars<K: Copy + std::fmt::Display>(
    rows: &[CategoryAverage<K>],
    color: impl Fn(K) -> (u8, u8, u8),
) -> Vec<Bar<'static>> {
    rows.iter()
        .map(|c| {
            Bar::default()
                .value((c.mean_total * 100.0).round().max(0.0) as u64)
                .text_value(format!("{:.2}", c.mean_total))
                .label(Line::from(c.key.to_string()))
                .style(Style::default().fg(rgb(color(c.key))))
                .value_style(Style::default().fg(Color::Black).bg(rgb(color(c.key))))
        })
        .collect()
}

fn draw_category_bars<K: Copy + std::fmt::Display>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    rows: &[CategoryAverage<K>],
    color: impl Fn(K) -> (u8, u8, u8),
) {
    let bars = category_bars(rows, color);
    frame.render_widget(category_chart(title, &bars, area.width), area);
}

fn category_chart<'a>(title: &str, bars: &'a [Bar<'a>], width: u16) -> BarChart<'a> {
    let n = bars.len().max(1) as u16;
    let inner_width = width.saturating_sub(2);
    let bar_width = (inner_width.saturating_sub(n - 1) / n).clamp(3, 14);

    BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .data(BarGroup::default().bars(bars))
        .bar_width(bar_width)
        .bar_gap(1)
}

/// Plot-ready trend data for the current view.
struct TrendSeries {
    points: Vec<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn trend_series(view: &DashboardView) -> Option<TrendSeries> {
    if view.monthly.is_empty() {
        return None;
    }
    let points: Vec<(f64, f64)> = view
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.total as f64))
        .collect();
    let labels = view.monthly.iter().map(|m| m.period.format("%Y-%m").to_string()).collect();

    // A single month still needs a non-empty x range.
    let x_bounds = [-0.5, (points.len() as f64 - 0.5).max(0.5)];

    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let (y_min, y_max) = if y_max > y_min { (y_min, y_max) } else { (y_min - 1.0, y_max + 1.0) };
    let pad = (y_max - y_min) * 0.05;
    let y_bounds = [(y_min - pad).max(0.0), y_max + pad];

    Some(TrendSeries {
        points,
        labels,
        x_bounds,
        y_bounds,
    })
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 0,
        bottom: 1,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Indices of the month labels to print: first, last and evenly spaced in between.
fn x_tick_indices(n: usize, max_ticks: usize) -> Vec<usize> {
    if n == 0 || max_ticks == 0 {
        return Vec::new();
    }
    if n <= max_ticks {
        return (0..n).collect();
    }
    let steps = max_ticks.max(2) - 1;
    let mut out: Vec<usize> = (0..=steps).map(|i| (i * (n - 1) + steps / 2) / steps).collect();
    out.dedup();
    out
}

fn draw_axis_ticks(frame: &mut ratatui::Frame<'_>, inner: Rect, chart: Rect, insets: AxisInsets, series: &TrendSeries) {
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = series.x_bounds;
    let [y0, y1] = series.y_bounds;

    let y = chart.y + chart.height;
    if y < inner.y + inner.height {
        // "YYYY-MM" plus a gap.
        let max_ticks = (chart.width / 9).max(1) as usize;
        for idx in x_tick_indices(series.labels.len(), max_ticks) {
            let label = &series.labels[idx];
            let u = (idx as f64 - x0) / (x1 - x0);
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let label_len = label.len() as u16;
            let start = x
                .saturating_sub(label_len / 2)
                .min((inner.x + inner.width).saturating_sub(label_len))
                .max(inner.x);
            frame.render_widget(
                Paragraph::new(label.as_str()).style(style),
                Rect {
                    x: start,
                    y,
                    width: label_len,
                    height: 1,
                },
            );
        }
    }

    let ticks = 3usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).alignment(Alignment::Right).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RentalRecord, TotalsPolicy};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, m, day).unwrap()
    }

    fn app() -> App {
        let rec = |date, season, weather, registered: u64, casual: u64| RentalRecord {
            date,
            season,
            weather,
            registered,
            casual,
            total: registered + casual,
        };
        let dataset = Dataset::from_records(vec![
            rec(d(1, 1), Season::Spring, Weather::Clear, 10, 5),
            rec(d(1, 2), Season::Spring, Weather::Clear, 8, 2),
            rec(d(2, 1), Season::Summer, Weather::Misty, 20, 0),
        ])
        .unwrap();
        let config = DashboardConfig {
            data_path: PathBuf::from("day.csv"),
            start: None,
            end: None,
            totals_policy: TotalsPolicy::Skip,
            plot_width: 72,
            plot_height: 16,
            json: false,
            export_dir: None,
            charts_dir: None,
        };
        let span = dataset.span();
        App::new(dataset, config, span)
    }

    #[test]
    fn arrow_keys_move_selected_bound_and_rebuild() {
        let mut app = app();
        assert_eq!(app.view.metrics.total, 45);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.view.range.end(), d(1, 1));
        assert_eq!(app.view.metrics.total, 15);

        app.handle_key(KeyCode::Right);
        assert_eq!(app.view.range.end(), d(1, 2));
        assert_eq!(app.view.metrics.total, 25);

        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.view.metrics.total, 45);
    }

    #[test]
    fn typed_date_applies_on_enter_and_esc_cancels() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert!(app.editing_date);
        for _ in 0..10 {
            app.handle_key(KeyCode::Backspace);
        }
        for c in "2011-02-01".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert!(!app.editing_date);
        assert_eq!(app.view.range.start(), d(2, 1));
        assert_eq!(app.view.by_season.len(), 1);

        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('x'));
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.view.range.start(), d(2, 1));
        assert_eq!(app.status, "Date edit canceled.");
    }

    #[test]
    fn invalid_typed_date_keeps_range() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Enter);
        assert!(app.status.starts_with("Invalid date"));
        assert_eq!(app.view.range, app.dataset.span());
    }

    #[test]
    fn q_quits_and_export_writes_files() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        app.export(&dir.path().join("exports"));
        assert!(app.status.starts_with("Wrote 5 files"));
        assert!(dir.path().join("exports/by_weather.csv").exists());
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn trend_series_bounds_cover_points() {
        let app = app();
        let series = trend_series(&app.view).unwrap();
        assert_eq!(series.labels, vec!["2011-01", "2011-02"]);
        assert_eq!(series.points, vec![(0.0, 25.0), (1.0, 20.0)]);
        assert!(series.y_bounds[0] < 20.0 && series.y_bounds[1] > 25.0);
        assert!(series.x_bounds[0] < 0.0 && series.x_bounds[1] > 1.0);
    }

    #[test]
    fn bars_carry_two_decimal_labels() {
        use ratatui::buffer::Buffer;
        use ratatui::widgets::Widget;

        let app = app();
        let bars = category_bars(&app.view.by_season, Season::rgb);
        assert_eq!(bars.len(), 2);
        // Heights keep two decimals: 20.00 -> 2000, 12.50 -> 1250.
        assert!(format!("{:?}", bars[0]).contains("value: 2000"));
        assert!(format!("{:?}", bars[1]).contains("value: 1250"));

        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        category_chart("Avg by season", &bars, area.width).render(area, &mut buf);
        let rendered: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("20.00"));
        assert!(rendered.contains("12.50"));
        assert!(rendered.contains("Summer"));
    }

    #[test]
    fn x_ticks_spread_over_months() {
        assert_eq!(x_tick_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(x_tick_indices(24, 4), vec![0, 8, 15, 23]);
        assert_eq!(x_tick_indices(0, 4), Vec::<usize>::new());
    }
}
