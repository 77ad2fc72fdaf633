//! Shared "view pipeline" used by both the report and the TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> range selection -> aggregations -> sorted, render-ready view
//!
//! The front-ends then focus on presentation (printing vs widgets). Building a
//! view is a pure function of `(dataset, range)`; the TUI calls it again on
//! every range change.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate;
use crate::domain::{CategoryAverage, DateRange, Metrics, PeriodTotals, Season, Weather, YearSplit};
use crate::error::AppError;
use crate::io::ingest::Dataset;

/// Everything the renderers need for one selected range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub range: DateRange,
    pub records_in_range: usize,
    pub metrics: Metrics,
    pub daily: Vec<PeriodTotals>,
    pub monthly: Vec<PeriodTotals>,
    /// Sorted descending by mean total.
    pub by_season: Vec<CategoryAverage<Season>>,
    /// Sorted descending by mean total.
    pub by_weather: Vec<CategoryAverage<Weather>>,
    /// Computed over the whole dataset, independent of `range`.
    pub yearly: Vec<YearSplit>,
}

/// Resolve the user's bounds against the dataset span.
///
/// Missing bounds default to the span; out-of-span bounds are clamped into it.
/// A selection that is still inverted after clamping is rejected.
pub fn resolve_range(
    span: DateRange,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, AppError> {
    let start = clamp_bound(span, start.unwrap_or(span.start()), "start");
    let end = clamp_bound(span, end.unwrap_or(span.end()), "end");
    DateRange::new(start, end)
}

fn clamp_bound(span: DateRange, requested: NaiveDate, which: &str) -> NaiveDate {
    let clamped = span.clamp(requested);
    if clamped != requested {
        tracing::warn!(%requested, %clamped, "{which} date outside dataset span {span}; clamped");
    }
    clamped
}

/// Build the render-ready view for `range`.
pub fn build_view(dataset: &Dataset, range: DateRange) -> DashboardView {
    let selected = dataset.select(range);

    let daily = aggregate::daily_totals(selected);
    let monthly = aggregate::monthly_totals(selected);
    let mut by_season = aggregate::average_by_season(selected);
    let mut by_weather = aggregate::average_by_weather(selected);
    sort_descending(&mut by_season);
    sort_descending(&mut by_weather);

    let metrics = Metrics::from_daily(&daily);
    let yearly = aggregate::yearly_split(dataset.records());

    tracing::debug!(
        %range,
        records = selected.len(),
        days = daily.len(),
        months = monthly.len(),
        "rebuilt dashboard view"
    );

    DashboardView {
        range,
        records_in_range: selected.len(),
        metrics,
        daily,
        monthly,
        by_season,
        by_weather,
        yearly,
    }
}

/// Highest mean first; ties keep category order (the sort is stable).
fn sort_descending<K>(rows: &mut [CategoryAverage<K>]) {
    rows.sort_by(|a, b| b.mean_total.partial_cmp(&a.mean_total).unwrap_or(Ordering::Equal));
}
