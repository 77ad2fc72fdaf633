//! Export the summary tables of a view to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one file per summary, plain headers, dates in ISO format.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::DashboardView;
use crate::domain::{CategoryAverage, PeriodTotals, YearSplit};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct PeriodRow {
    date: NaiveDate,
    total_registered: u64,
    total_casual: u64,
    total_customer: u64,
}

impl From<&PeriodTotals> for PeriodRow {
    fn from(p: &PeriodTotals) -> Self {
        Self {
            date: p.period,
            total_registered: p.registered,
            total_casual: p.casual,
            total_customer: p.total,
        }
    }
}

#[derive(Debug, Serialize)]
struct CategoryRow {
    category: String,
    mean_total: String,
    days: usize,
}

impl<K: std::fmt::Display> From<&CategoryAverage<K>> for CategoryRow {
    fn from(c: &CategoryAverage<K>) -> Self {
        Self {
            category: c.key.to_string(),
            mean_total: format!("{:.2}", c.mean_total),
            days: c.days,
        }
    }
}

#[derive(Debug, Serialize)]
struct YearRow {
    year: i32,
    registered: u64,
    casual: u64,
    registered_pct: String,
    casual_pct: String,
}

impl From<&YearSplit> for YearRow {
    fn from(y: &YearSplit) -> Self {
        Self {
            year: y.year,
            registered: y.registered,
            casual: y.casual,
            registered_pct: format!("{:.1}", y.registered_share() * 100.0),
            casual_pct: format!("{:.1}", y.casual_share() * 100.0),
        }
    }
}

/// Write every summary of `view` into `dir`, returning the written paths.
pub fn write_summaries(dir: &Path, view: &DashboardView) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::runtime(format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let written = vec![
        write_rows(&dir.join("daily.csv"), view.daily.iter().map(PeriodRow::from))?,
        write_rows(&dir.join("monthly.csv"), view.monthly.iter().map(PeriodRow::from))?,
        write_rows(&dir.join("by_season.csv"), view.by_season.iter().map(CategoryRow::from))?,
        write_rows(&dir.join("by_weather.csv"), view.by_weather.iter().map(CategoryRow::from))?,
        write_rows(&dir.join("yearly_split.csv"), view.yearly.iter().map(YearRow::from))?,
    ];

    tracing::info!(dir = %dir.display(), files = written.len(), "exported summaries");
    Ok(written)
}

fn write_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<PathBuf, AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::runtime(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_view;
    use crate::domain::TotalsPolicy;
    use crate::io::ingest::read_dataset;

    #[test]
    fn writes_one_file_per_summary() {
        let csv = "dteday,season,weathersit,casual,registered,cnt\n\
                   2011-01-01,1,1,5,10,15\n\
                   2011-01-02,1,1,2,8,10\n\
                   2011-02-01,2,2,0,20,20\n";
        let ds = read_dataset(csv.as_bytes(), TotalsPolicy::Skip).unwrap();
        let view = build_view(&ds, ds.span());

        let dir = tempfile::tempdir().unwrap();
        let written = write_summaries(dir.path(), &view).unwrap();
        assert_eq!(written.len(), 5);

        let monthly = std::fs::read_to_string(dir.path().join("monthly.csv")).unwrap();
        assert_eq!(
            monthly,
            "date,total_registered,total_casual,total_customer\n\
             2011-01-31,18,7,25\n\
             2011-02-28,20,0,20\n"
        );

        let seasons = std::fs::read_to_string(dir.path().join("by_season.csv")).unwrap();
        assert_eq!(seasons, "category,mean_total,days\nSummer,20.00,1\nSpring,12.50,2\n");
    }
}
