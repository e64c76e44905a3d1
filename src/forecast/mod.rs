//! Forecasting core: training jobs, persisted models and forecast payloads.
//!
//! [`Trainer`] fits and persists models into a [`ModelStore`]; [`Predictor`]
//! reads the newest one back and always produces a renderable
//! [`ForecastPayload`], degrading to an error-tagged empty payload instead of
//! failing.

mod error;
mod model_store;
mod payload;
mod predictor;
mod trainer;

pub use error::{StoreError, TrainingError};
pub use model_store::{LatestModel, MODEL_EXTENSION, MODEL_PREFIX, ModelStore, PersistedModel};
pub use payload::ForecastPayload;
pub use predictor::{
    CORRUPT_MODEL, FORECAST_HORIZON, NO_DATA, NO_MODEL, Predictor, SPEND_UPLIFT, forecast_from,
    format_compact, future_rows,
};
pub use trainer::{HOLDOUT_FRACTION, RANDOM_SEED, Trainer, holdout_split};

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::dataset::Column;
use crate::ml::gbdt_stump::{MAX_ROUNDS, TrainOptions};

/// Current local time, falling back to UTC when the offset is unknown.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Regression algorithm used for a training job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    GradientBoosting,
}

impl Algorithm {
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::GradientBoosting => "Gradient Boosting",
        }
    }
}

/// Named numeric hyperparameters.
///
/// Recognized keys: `n_estimators` (default 100), `learning_rate` (0.1),
/// `bins` (32) and `subsample` (1.0). Other keys are kept but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hyperparameters(BTreeMap<String, f64>);

impl Hyperparameters {
    pub const KNOWN_KEYS: [&'static str; 4] = ["n_estimators", "learning_rate", "bins", "subsample"];

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied().filter(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of boosting rounds, clamped to `1..=MAX_ROUNDS`.
    pub fn n_estimators(&self) -> usize {
        self.get("n_estimators")
            .map(|v| v.round().clamp(1.0, MAX_ROUNDS as f64) as usize)
            .unwrap_or(100)
    }

    pub fn learning_rate(&self) -> f64 {
        self.get("learning_rate")
            .filter(|v| *v > 0.0)
            .unwrap_or(0.1)
    }

    pub fn bins(&self) -> usize {
        self.get("bins")
            .map(|v| v.round().clamp(2.0, 256.0) as usize)
            .unwrap_or(32)
    }

    pub fn subsample(&self) -> f64 {
        self.get("subsample")
            .filter(|v| *v > 0.0)
            .map(|v| v.min(1.0))
            .unwrap_or(1.0)
    }

    /// Keys that will be ignored by the trainer.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|key| !Self::KNOWN_KEYS.contains(key))
            .collect()
    }

    /// Booster options with the fixed reproducibility seed.
    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            rounds: self.n_estimators(),
            learning_rate: self.learning_rate(),
            bins: self.bins(),
            subsample: self.subsample(),
            seed: RANDOM_SEED,
        }
    }
}

/// A retraining request; immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    pub selected_features: BTreeSet<Column>,
    pub algorithm: Algorithm,
    pub hyperparameters: Hyperparameters,
}

impl TrainingJob {
    /// Feature columns in canonical order; the default set when none are selected.
    pub fn features(&self) -> Vec<Column> {
        let selected: Vec<Column> = self
            .selected_features
            .iter()
            .copied()
            .filter(|column| *column != Column::Sales)
            .collect();
        if selected.is_empty() {
            Column::DEFAULT_FEATURES.to_vec()
        } else {
            selected
        }
    }
}

/// Outcome of one completed training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingResult {
    /// Holdout root-mean-squared error.
    pub rmse: f64,
    /// `sales_model_YYYYMMDD-HHMMSS`.
    pub model_id: String,
    pub features_used: Vec<Column>,
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub model_path: PathBuf,
}

/// A report request handled by the report job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJob {
    pub output_path: PathBuf,
    pub report_name: String,
}
