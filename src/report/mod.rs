//! Text report for `bikes report`.
//!
//! Formatting lives here so the aggregation code stays free of presentation
//! and output changes stay localized (the report is covered by snapshot-style tests).

pub mod format;

pub use format::*;
