//! Command-line parsing for the bike-rental dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::TotalsPolicy;

pub mod picker;

/// Environment variable holding the default data file (also read from `.env`).
pub const DATA_ENV: &str = "BIKES_DATA";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bikes", version, about = "Bike-rental reporting dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print metrics, summaries and ASCII charts for a date range; optionally export.
    Report(ReportArgs),
    /// Launch the interactive dashboard.
    ///
    /// Uses the same view pipeline as `bikes report`, but lets you move the
    /// date range with the keyboard and re-renders on every change.
    Tui(TuiArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Daily rentals CSV. When omitted, `BIKES_DATA` is used, then an interactive picker.
    #[arg(short = 'f', long, env = DATA_ENV, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// What to do with rows where `total != registered + casual`.
    #[arg(long, value_enum, default_value_t = TotalsPolicy::Skip)]
    pub totals: TotalsPolicy,

    /// First day of the range (YYYY-MM-DD). Defaults to the first day in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD). Defaults to the last day in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,
}

/// Options for the one-shot report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Trend chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Print the view as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Write summary CSVs into this directory.
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Write SVG charts into this directory.
    #[arg(long, value_name = "DIR")]
    pub charts: Option<PathBuf>,
}

/// Options for the interactive dashboard.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_args_parse() {
        let cli = Cli::try_parse_from([
            "bikes", "report", "-f", "day.csv", "--start", "2011-01-01", "--end", "2011-03-31", "--totals",
            "strict", "--json",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.data.file, Some(PathBuf::from("day.csv")));
        assert_eq!(args.data.start, NaiveDate::from_ymd_opt(2011, 1, 1));
        assert_eq!(args.data.end, NaiveDate::from_ymd_opt(2011, 3, 31));
        assert_eq!(args.data.totals, TotalsPolicy::Strict);
        assert!(args.json);
        assert_eq!(args.width, 72);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["bikes", "tui", "-f", "day.csv", "--start", "01/01/2011"]).is_err());
    }
}
