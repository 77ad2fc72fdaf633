//! Formatted terminal output for `bikes report`.
//!
//! Sections in order: dataset header, metrics, monthly trend and table,
//! category averages, yearly split, and the rows skipped on load.

use crate::app::pipeline::DashboardView;
use crate::domain::{CategoryAverage, DashboardConfig};
use crate::io::ingest::Dataset;
use crate::plot::ascii;

/// How many skipped rows are listed before the report summarizes the rest.
const MAX_ROW_ERRORS: usize = 5;

/// Format the full report for one view.
pub fn format_dashboard(view: &DashboardView, dataset: &Dataset, config: &DashboardConfig) -> String {
    let mut out = String::new();

    out.push_str("=== Bike Rent Dashboard ===\n");
    out.push_str(&format!("File: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        dataset.rows_read,
        dataset.records().len(),
        dataset.row_errors.len()
    ));
    out.push_str(&format!("Data span: {}\n", dataset.span()));
    out.push_str(&format!(
        "Range: {} ({} day(s), {} record(s))\n",
        view.range,
        view.range.days(),
        view.records_in_range
    ));

    out.push_str("\nMetrics:\n");
    out.push_str(&format!("- Total rentals      : {}\n", view.metrics.total));
    out.push_str(&format!("- Registered rentals : {}\n", view.metrics.registered));
    out.push_str(&format!("- Casual rentals     : {}\n", view.metrics.casual));

    out.push('\n');
    out.push_str(&ascii::render_trend(&view.monthly, config.plot_width, config.plot_height));
    out.push('\n');
    out.push_str(&format_month_table(view));

    out.push_str("\nAverage rentals by season:\n");
    out.push_str(&ascii::render_bars(&bar_rows(&view.by_season), config.plot_width));

    out.push_str("\nAverage rentals by weather:\n");
    out.push_str(&ascii::render_bars(&bar_rows(&view.by_weather), config.plot_width));

    out.push_str("\nRegistered vs casual by year (whole dataset):\n");
    out.push_str(&ascii::render_split(&view.yearly, config.plot_width));

    if !dataset.row_errors.is_empty() {
        out.push_str(&format!("\nSkipped rows ({}):\n", dataset.row_errors.len()));
        for e in dataset.row_errors.iter().take(MAX_ROW_ERRORS) {
            out.push_str(&format!("- line {}: {}\n", e.line, e.message));
        }
        let rest = dataset.row_errors.len().saturating_sub(MAX_ROW_ERRORS);
        if rest > 0 {
            out.push_str(&format!("- ... and {rest} more\n"));
        }
    }

    out
}

fn format_month_table(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<8} {:>12} {:>12} {:>12}\n", "month", "registered", "casual", "total"));
    out.push_str(&format!("{:-<8} {:-<12} {:-<12} {:-<12}\n", "", "", "", ""));
    for m in &view.monthly {
        out.push_str(&format!(
            "{:<8} {:>12} {:>12} {:>12}\n",
            m.period.format("%Y-%m"),
            m.registered,
            m.casual,
            m.total
        ));
    }
    out
}

fn bar_rows<K: std::fmt::Display>(rows: &[CategoryAverage<K>]) -> Vec<(String, f64)> {
    rows.iter().map(|c| (c.key.to_string(), c.mean_total)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{build_view, resolve_range};
    use crate::domain::{RentalRecord, Season, TotalsPolicy, Weather};
    use crate::io::ingest::{RowError, read_dataset};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn config() -> DashboardConfig {
        DashboardConfig {
            data_path: PathBuf::from("day.csv"),
            start: None,
            end: None,
            totals_policy: TotalsPolicy::Skip,
            plot_width: 40,
            plot_height: 6,
            json: false,
            export_dir: None,
            charts_dir: None,
        }
    }

    fn dataset() -> Dataset {
        let d = |m, day| NaiveDate::from_ymd_opt(2011, m, day).unwrap();
        let rec = |date, season, weather, registered: u64, casual: u64| RentalRecord {
            date,
            season,
            weather,
            registered,
            casual,
            total: registered + casual,
        };
        Dataset::from_records(vec![
            rec(d(1, 1), Season::Spring, Weather::Clear, 10, 5),
            rec(d(1, 2), Season::Spring, Weather::Clear, 8, 2),
            rec(d(2, 1), Season::Summer, Weather::Misty, 20, 0),
        ])
        .unwrap()
    }

    #[test]
    fn report_contains_metrics_tables_and_sorted_bars() {
        let ds = dataset();
        let view = build_view(&ds, ds.span());
        let txt = format_dashboard(&view, &ds, &config());

        assert!(txt.starts_with("=== Bike Rent Dashboard ===\nFile: day.csv\n"));
        assert!(txt.contains("Rows: read=3 used=3 skipped=0\n"));
        assert!(txt.contains("Range: 2011-01-01 → 2011-02-01 (32 day(s), 3 record(s))\n"));
        assert!(txt.contains("- Total rentals      : 45\n"));
        assert!(txt.contains("- Registered rentals : 38\n"));
        assert!(txt.contains("- Casual rentals     : 7\n"));
        assert!(txt.contains("2011-01            18            7           25\n"));
        assert!(txt.contains("2011-02            20            0           20\n"));

        // Highest mean first, two decimals.
        let summer = txt.find("Summer |").unwrap();
        let spring = txt.find("Spring |").unwrap();
        assert!(summer < spring);
        assert!(txt.contains(" 20.00\n"));
        assert!(txt.contains(" 12.50\n"));
        assert!(txt.contains("Registered  84.4%  Casual  15.6%"));
        assert!(!txt.contains("Skipped rows"));
    }

    #[test]
    fn report_lists_skipped_rows() {
        let csv = "dteday,season,weathersit,casual,registered,cnt\n\
                   2011-01-01,1,1,5,10,15\n\
                   2011-01-02,1,1,2,8,99\n";
        let ds = read_dataset(csv.as_bytes(), TotalsPolicy::Skip).unwrap();
        let view = build_view(&ds, resolve_range(ds.span(), None, None).unwrap());
        let txt = format_dashboard(&view, &ds, &config());

        assert!(txt.contains("Rows: read=2 used=1 skipped=1\n"));
        assert!(txt.contains("Skipped rows (1):\n- line 3: total 99 != registered 8 + casual 2 on 2011-01-02\n"));
    }

    #[test]
    fn long_error_lists_are_truncated() {
        let mut ds = dataset();
        ds.row_errors = (0..7)
            .map(|i| RowError { line: i + 2, message: "bad".to_string() })
            .collect();
        let view = build_view(&ds, ds.span());
        let txt = format_dashboard(&view, &ds, &config());
        assert!(txt.contains("- line 6: bad\n- ... and 2 more\n"));
        assert!(!txt.contains("line 7:"));
    }
}
