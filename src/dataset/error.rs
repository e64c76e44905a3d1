use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading historical sales records.
#[derive(Debug, Error)]
pub enum DataError {
    /// The source file does not exist.
    #[error("Historical data not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Failed to read historical data {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Historical data {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },
}
