//! Error types for the body-scan dashboard

use thiserror::Error;

/// Rejected request parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing access token")]
    MissingAccessToken,

    #[error("Missing refresh token")]
    MissingRefreshToken,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Unknown range: {0}")]
    UnknownRange(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Range start {from} is after range end {to}")]
    InvertedRange { from: i64, to: i64 },

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),
}

/// CSV export and import errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV flush error: {0}")]
    Flush(String),

    #[error("CSV encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Malformed export: {0}")]
    Malformed(String),
}
