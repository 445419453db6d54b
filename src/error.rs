// Crate-wide error type.
use thiserror::Error;

/// Errors raised by the outer layers (configuration, file IO, export, CLI
/// argument resolution). The parsing and aggregation functions never fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Select at least one date for the date range")]
    NoDateSelected,

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown platform '{0}': expected summary, tiktok or facebook")]
    UnknownPlatform(String),

    #[error("Unknown month '{0}': expected a three-letter code (JAN..DEC) or a number 1-12")]
    UnknownMonth(String),
}

pub type Result<T> = std::result::Result<T, Error>;
