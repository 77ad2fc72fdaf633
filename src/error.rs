//! Application error type.
//!
//! Every failure carries the process exit code it maps to, so `main` can stay a
//! thin wrapper:
//!
//! - `2`: bad input (arguments, missing/unreadable file, malformed rows)
//! - `3`: the data itself is unusable (no rows, strict totals violation)
//! - `4`: runtime/output failures (terminal, chart rendering, export writes)

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    Data(String),

    #[error("{0}")]
    Runtime(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Input(_) => 2,
            AppError::Data(_) => 3,
            AppError::Runtime(_) => 4,
        }
    }
}
