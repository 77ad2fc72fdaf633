//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - categorical labels (`Season`, `Weather`) and their source-file encodings
//! - the input record (`RentalRecord`) and date selection (`DateRange`)
//! - summary rows produced by the aggregations (`PeriodTotals`, `CategoryAverage`, ...)
//! - run configuration (`DashboardConfig`, `TotalsPolicy`)

pub mod types;

pub use types::*;
