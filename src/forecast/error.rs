use std::path::PathBuf;
use thiserror::Error;

use crate::dataset::{Column, DataError};

/// Failures reading or writing the model directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create model directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to list model directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write model {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode model {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to encode model: {0}")]
    Encode(serde_json::Error),
    #[error("Model {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Failed to format model timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Failures raised by the trainer. Training never retries.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Feature table is empty")]
    EmptyTable,
    #[error("Feature table has no values for required column '{0}'")]
    MissingColumn(Column),
    #[error("No feature columns selected")]
    NoFeatures,
    #[error("Target column '{0}' cannot also be a feature")]
    TargetInFeatures(Column),
    #[error("Need at least 2 rows with a target value to train (got {rows})")]
    InsufficientRows { rows: usize },
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Model fitting failed: {0}")]
    Fit(String),
    #[error(transparent)]
    Persist(#[from] StoreError),
}
