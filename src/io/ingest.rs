//! CSV ingest and normalization.
//!
//! This module turns a daily bike-rental CSV into a sorted, read-only
//! `Dataset` of `RentalRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail fast on malformed values**: a bad date, category or count aborts the load
//! - **Explicit totals policy**: rows with `total != registered + casual` are
//!   skipped and reported, rejected, or kept, depending on `TotalsPolicy`
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{DateRange, RentalRecord, Season, TotalsPolicy, Weather};
use crate::error::AppError;

const DATE_COLUMNS: &[&str] = &["dteday", "date"];
const SEASON_COLUMNS: &[&str] = &["season"];
const WEATHER_COLUMNS: &[&str] = &["weathersit", "weather"];
const REGISTERED_COLUMNS: &[&str] = &["registered"];
const CASUAL_COLUMNS: &[&str] = &["casual"];
const TOTAL_COLUMNS: &[&str] = &["cnt", "total", "count"];

/// A row dropped during ingest (only produced by `TotalsPolicy::Skip`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// The loaded rental table.
///
/// Records are sorted ascending by date, which lets `select` slice a date
/// range without copying.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<RentalRecord>,
    span: DateRange,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

impl Dataset {
    /// Build a dataset from already-parsed records.
    pub fn from_records(mut records: Vec<RentalRecord>) -> Result<Self, AppError> {
        records.sort_by_key(|r| r.date);
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(AppError::data("No rental records remain after loading."));
        };
        let span = DateRange::new(first.date, last.date)?;
        let rows_read = records.len();
        Ok(Self {
            records,
            span,
            rows_read,
            row_errors: Vec::new(),
        })
    }

    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    /// First and last date present in the data.
    pub fn span(&self) -> DateRange {
        self.span
    }

    /// Records whose date falls inside `range` (inclusive on both ends).
    pub fn select(&self, range: DateRange) -> &[RentalRecord] {
        let lo = self.records.partition_point(|r| r.date < range.start());
        let hi = self.records.partition_point(|r| r.date <= range.end());
        let selected = &self.records[lo..hi.max(lo)];
        debug_assert!(selected.iter().all(|r| range.contains(r.date)));
        selected
    }
}

/// Load a dataset from a CSV file on disk.
pub fn load_dataset(path: &Path, policy: TotalsPolicy) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let dataset = read_dataset(file, policy)?;

    tracing::info!(
        path = %path.display(),
        rows_read = dataset.rows_read,
        rows_used = dataset.records.len(),
        skipped = dataset.row_errors.len(),
        span = %dataset.span,
        "loaded rental dataset"
    );
    Ok(dataset)
}

/// Load a dataset from any CSV byte source.
pub fn read_dataset<R: Read>(source: R, policy: TotalsPolicy) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = Columns::resolve(&build_header_map(&headers))?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = result.map_err(|e| AppError::input(format!("CSV parse error on line {line}: {e}")))?;
        let row = parse_row(&record, &columns).map_err(|e| AppError::input(format!("Line {line}: {e}")))?;

        if row.totals_consistent() {
            records.push(row);
            continue;
        }

        let message = format!(
            "total {} != registered {} + casual {} on {}",
            row.total, row.registered, row.casual, row.date
        );
        match policy {
            TotalsPolicy::Strict => {
                return Err(AppError::data(format!("Line {line}: {message}.")));
            }
            TotalsPolicy::Skip => {
                tracing::warn!(line, "skipping row: {message}");
                row_errors.push(RowError { line, message });
            }
            TotalsPolicy::Trust => {
                tracing::warn!(line, "keeping inconsistent row: {message}");
                records.push(row);
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::data(format!(
            "No usable rows: read {rows_read}, skipped {}.",
            row_errors.len()
        )));
    }

    let mut dataset = Dataset::from_records(records)?;
    dataset.rows_read = rows_read;
    dataset.row_errors = row_errors;
    Ok(dataset)
}

/// Column indices of the required fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    season: usize,
    weather: usize,
    registered: usize,
    casual: usize,
    total: usize,
}

impl Columns {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, AppError> {
        Ok(Self {
            date: find_column(header_map, DATE_COLUMNS)?,
            season: find_column(header_map, SEASON_COLUMNS)?,
            weather: find_column(header_map, WEATHER_COLUMNS)?,
            registered: find_column(header_map, REGISTERED_COLUMNS)?,
            casual: find_column(header_map, CASUAL_COLUMNS)?,
            total: find_column(header_map, TOTAL_COLUMNS)?,
        })
    }
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    aliases
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            let names: Vec<String> = aliases.iter().map(|n| format!("`{n}`")).collect();
            AppError::input(format!("Missing required column: {}", names.join(" or ")))
        })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Keep the first occurrence when a header is duplicated.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<RentalRecord, String> {
    let date = parse_date(get_required(record, columns.date, "date")?)?;

    let season_raw = get_required(record, columns.season, "season")?;
    let season = Season::parse(season_raw).ok_or_else(|| format!("Unknown season '{season_raw}'."))?;

    let weather_raw = get_required(record, columns.weather, "weather")?;
    let weather = Weather::parse(weather_raw).ok_or_else(|| format!("Unknown weather '{weather_raw}'."))?;

    Ok(RentalRecord {
        date,
        season,
        weather,
        registered: parse_count(get_required(record, columns.registered, "registered")?, "registered")?,
        casual: parse_count(get_required(record, columns.casual, "casual")?, "casual")?,
        total: parse_count(get_required(record, columns.total, "total")?, "total")?,
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are expected, but spreadsheet round-trips often produce
    // `DD/MM/YYYY` or a full timestamp. Accept a small fixed set of formats.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY."
    ))
}

fn parse_count(s: &str, name: &str) -> Result<u64, String> {
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    // Tolerate integral floats such as `985.0` from dataframe exports.
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(format!("Invalid `{name}` count '{s}' (expected a non-negative integer).")),
    }
}
