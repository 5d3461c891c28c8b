use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    #[error("invalid date key `{0}`: expected zero-padded YYYY-MM-DD")]
    Invalid(String),
    #[error("date out of range: {year}-{month0}-{day} (0-based month)")]
    OutOfRange { year: i32, month0: i32, day: i32 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode store `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("persisted data under `{key}` is not a JSON array: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there is nothing to export")]
    NothingToExport,
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write export file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown JOURNAL_MODE `{0}`; expected `diary` or `interview`")]
    UnknownMode(String),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}
