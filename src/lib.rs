//! `bike-dashboard` library crate.
//!
//! The binary (`bikes`) is a thin wrapper around this library so that:
//!
//! - the aggregations and the view builder are testable without a terminal
//! - the report and the TUI share one compute path

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
