//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - aggregated in-memory on every range change
//! - exported to JSON/CSV
//! - rendered by both the text report and the TUI

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Season label of a rental day.
///
/// Declaration order is the grouping order used by the aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Human-readable label for terminal and chart output.
    pub fn display_name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    /// Numeric code used by the public bike-sharing dataset (`1..=4`).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    /// Parse either a numeric code or a label (English or Indonesian).
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        match s.as_str() {
            "spring" | "springer" | "musim semi" => Some(Season::Spring),
            "summer" | "musim panas" => Some(Season::Summer),
            "fall" | "autumn" | "musim gugur" => Some(Season::Fall),
            "winter" | "musim dingin" => Some(Season::Winter),
            _ => None,
        }
    }

    /// Chart color (RGB).
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Season::Spring => (144, 238, 144), // lightgreen
            Season::Summer => (255, 215, 0),   // gold
            Season::Fall => (240, 128, 128),   // lightcoral
            Season::Winter => (135, 206, 250), // lightskyblue
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Weather situation of a rental day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Misty,
    LightPrecipitation,
    HeavyPrecipitation,
}

impl Weather {
    pub fn display_name(self) -> &'static str {
        match self {
            Weather::Clear => "Clear",
            Weather::Misty => "Misty",
            Weather::LightPrecipitation => "Light snow/rain",
            Weather::HeavyPrecipitation => "Heavy rain",
        }
    }

    /// Numeric `weathersit` code used by the public bike-sharing dataset (`1..=4`).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Weather::Clear),
            2 => Some(Weather::Misty),
            3 => Some(Weather::LightPrecipitation),
            4 => Some(Weather::HeavyPrecipitation),
            _ => None,
        }
    }

    /// Parse either a numeric code or a label (English or Indonesian).
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        match s.as_str() {
            "clear" | "cerah" => Some(Weather::Clear),
            "misty" | "mist" | "cloudy" | "mendung" => Some(Weather::Misty),
            "light snow/rain" | "light rain/snow" | "light precipitation" | "light_precipitation"
            | "salju ringan/hujan" => Some(Weather::LightPrecipitation),
            "heavy rain" | "heavy precipitation" | "heavy_precipitation" | "hujan lebat" => {
                Some(Weather::HeavyPrecipitation)
            }
            _ => None,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Weather::Clear => (255, 215, 0),                // gold
            Weather::Misty => (135, 206, 250),              // lightskyblue
            Weather::LightPrecipitation => (128, 128, 128), // grey
            Weather::HeavyPrecipitation => (105, 105, 105), // dimgrey
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Registered-user slice color of the yearly split (dodgerblue).
pub const REGISTERED_RGB: (u8, u8, u8) = (30, 144, 255);
/// Casual-user slice color of the yearly split (skyblue).
pub const CASUAL_RGB: (u8, u8, u8) = (135, 206, 235);
/// Monthly trend line color (orangered).
pub const TREND_RGB: (u8, u8, u8) = (255, 69, 0);

/// One day of rentals, as loaded from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub date: NaiveDate,
    pub season: Season,
    pub weather: Weather,
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

impl RentalRecord {
    /// `total == registered + casual`.
    pub fn totals_consistent(&self) -> bool {
        self.registered.checked_add(self.casual) == Some(self.total)
    }
}

/// Inclusive calendar-date selection. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::input(format!(
                "Start date {start} is after end date {end}."
            )));
        }
        Ok(Self { start, end })
    }

    /// A single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Clamp a date into this range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }

    /// Number of calendar days covered (inclusive).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Summed counts for one date bucket (a day, or a month keyed by its last day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub period: NaiveDate,
    pub registered: u64,
    pub casual: u64,
    pub total: u64,
}

/// Mean daily total for one category value, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage<K> {
    pub key: K,
    pub mean_total: f64,
    /// Number of records in the group.
    pub days: usize,
}

/// Registered vs casual rentals for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSplit {
    pub year: i32,
    pub registered: u64,
    pub casual: u64,
}

impl YearSplit {
    /// Saturates instead of overflowing on absurd (`--totals trust`) counts.
    pub fn total(&self) -> u64 {
        self.registered.saturating_add(self.casual)
    }

    /// Registered share in `[0, 1]` (`0.0` for an empty year).
    pub fn registered_share(&self) -> f64 {
        share(self.registered, self.total())
    }

    pub fn casual_share(&self) -> f64 {
        share(self.casual, self.total())
    }
}

fn share(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Headline metrics over the selected range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total: u64,
    pub registered: u64,
    pub casual: u64,
}

impl Metrics {
    /// Sum the columns of a daily summary.
    pub fn from_daily(daily: &[PeriodTotals]) -> Self {
        daily.iter().fold(Metrics::default(), |acc, d| Metrics {
            total: acc.total + d.total,
            registered: acc.registered + d.registered,
            casual: acc.casual + d.casual,
        })
    }
}

/// What to do with rows where `total != registered + casual`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TotalsPolicy {
    /// Drop the row and report it as a row error.
    #[default]
    Skip,
    /// Abort the load on the first violating row.
    Strict,
    /// Keep the row as-is.
    Trust,
}

/// Resolved run configuration, built from CLI arguments and the environment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub totals_policy: TotalsPolicy,
    pub plot_width: usize,
    pub plot_height: usize,
    pub json: bool,
    pub export_dir: Option<PathBuf>,
    pub charts_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn season_parses_codes_and_labels() {
        assert_eq!(Season::parse("1"), Some(Season::Spring));
        assert_eq!(Season::parse(" 4 "), Some(Season::Winter));
        assert_eq!(Season::parse("Musim Gugur"), Some(Season::Fall));
        assert_eq!(Season::parse("autumn"), Some(Season::Fall));
        assert_eq!(Season::parse("5"), None);
        assert_eq!(Season::parse("monsoon"), None);
    }

    #[test]
    fn weather_parses_codes_and_labels() {
        assert_eq!(Weather::parse("2"), Some(Weather::Misty));
        assert_eq!(Weather::parse("Cerah"), Some(Weather::Clear));
        assert_eq!(Weather::parse("Salju Ringan/Hujan"), Some(Weather::LightPrecipitation));
        assert_eq!(Weather::parse("0"), None);
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        assert!(DateRange::new(d(2011, 2, 1), d(2011, 1, 1)).is_err());
        let r = DateRange::new(d(2011, 1, 1), d(2011, 1, 31)).unwrap();
        assert_eq!(r.days(), 31);
        assert!(r.contains(d(2011, 1, 31)));
        assert!(!r.contains(d(2011, 2, 1)));
        assert_eq!(r.clamp(d(2010, 6, 1)), d(2011, 1, 1));
        assert_eq!(DateRange::day(d(2011, 1, 1)).days(), 1);
    }

    #[test]
    fn year_split_shares_handle_empty_year() {
        let empty = YearSplit { year: 2011, registered: 0, casual: 0 };
        assert_eq!(empty.registered_share(), 0.0);

        let split = YearSplit { year: 2012, registered: 3, casual: 1 };
        assert!((split.registered_share() - 0.75).abs() < 1e-12);
        assert!((split.casual_share() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn year_split_total_saturates() {
        let split = YearSplit { year: 2011, registered: u64::MAX, casual: 1 };
        assert_eq!(split.total(), u64::MAX);
        assert!(split.registered_share().is_finite());
        assert!(split.casual_share().is_finite());
    }

    #[test]
    fn totals_consistency_check() {
        let mut r = RentalRecord {
            date: d(2011, 1, 1),
            season: Season::Spring,
            weather: Weather::Clear,
            registered: 10,
            casual: 5,
            total: 15,
        };
        assert!(r.totals_consistent());
        r.total = 16;
        assert!(!r.totals_consistent());
    }
}
