//! Tracing subscriber setup.
//!
//! The filter comes from `BIKES_LOG` (same syntax as `RUST_LOG`), defaulting to
//! `warn`. The report writes logs to stderr; the TUI owns the terminal, so it
//! logs to a file instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::AppError;

pub const LOG_ENV: &str = "BIKES_LOG";
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr.
pub fn init_stderr() -> Result<(), AppError> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::runtime(format!("Failed to install logger: {e}")))
}

/// Log to `<dir>/<file_name>`. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_file(dir: &Path, file_name: &str) -> Result<WorkerGuard, AppError> {
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::runtime(format!("Failed to install logger: {e}")))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logger_flushes_when_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_file(dir.path(), "bikes-test.log").unwrap();
        tracing::error!(exit_code = 3, "No usable rows: read 2, skipped 2.");
        drop(guard);

        let logged = std::fs::read_to_string(dir.path().join("bikes-test.log")).unwrap();
        assert!(logged.contains("No usable rows: read 2, skipped 2."));
        assert!(logged.contains("exit_code=3"));
    }
}
