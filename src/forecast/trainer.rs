use time::OffsetDateTime;
use tracing::{info, warn};

use super::error::TrainingError;
use super::model_store::{ModelStore, PersistedModel};
use super::{Algorithm, Hyperparameters, TrainingResult};
use crate::dataset::{Column, FeatureRow};
use crate::ml::gbdt_stump::{TrainDataset, train_gbdt_stump};
use crate::ml::metrics::RegressionMetrics;

/// Share of trailing rows held out for evaluation.
pub const HOLDOUT_FRACTION: f64 = 0.2;
/// Seed used for every fit so identical inputs give identical models.
pub const RANDOM_SEED: u64 = 42;

/// Split `rows` chronologically into `(train_len, holdout_len)`.
///
/// The holdout is the trailing `ceil(20%)`, but always leaves at least one
/// training row.
pub fn holdout_split(rows: usize) -> (usize, usize) {
    if rows < 2 {
        return (rows, 0);
    }
    let holdout = ((rows as f64) * HOLDOUT_FRACTION).ceil() as usize;
    let holdout = holdout.clamp(1, rows - 1);
    (rows - holdout, holdout)
}

/// Fits gradient-boosted regressors and persists them to a [`ModelStore`].
#[derive(Debug, Clone)]
pub struct Trainer {
    store: ModelStore,
}

impl Trainer {
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Train on `rows`, evaluate on the chronological holdout and persist.
    pub fn train(
        &self,
        rows: &[FeatureRow],
        target: Column,
        features: &[Column],
        hyperparameters: &Hyperparameters,
    ) -> Result<TrainingResult, TrainingError> {
        self.train_at(rows, target, features, hyperparameters, super::local_now())
    }

    /// [`Trainer::train`] with an explicit creation time, which fixes the model id.
    pub fn train_at(
        &self,
        rows: &[FeatureRow],
        target: Column,
        features: &[Column],
        hyperparameters: &Hyperparameters,
        created: OffsetDateTime,
    ) -> Result<TrainingResult, TrainingError> {
        let features = dedup_features(features);
        if features.is_empty() {
            return Err(TrainingError::NoFeatures);
        }
        if features.contains(&target) {
            return Err(TrainingError::TargetInFeatures(target));
        }
        if rows.is_empty() {
            return Err(TrainingError::EmptyTable);
        }
        let labelled: Vec<(&FeatureRow, f64)> = rows
            .iter()
            .filter_map(|row| row.value(target).map(|y| (row, y)))
            .filter(|(_, y)| y.is_finite())
            .collect();
        if labelled.is_empty() {
            return Err(TrainingError::MissingColumn(target));
        }
        let (train_len, holdout_len) = holdout_split(labelled.len());
        if holdout_len == 0 {
            return Err(TrainingError::InsufficientRows {
                rows: labelled.len(),
            });
        }
        let unknown = hyperparameters.unknown_keys();
        if !unknown.is_empty() {
            warn!("Ignoring unknown hyperparameters: {}", unknown.join(", "));
        }

        let (train_rows, holdout_rows) = labelled.split_at(train_len);
        let dataset = TrainDataset {
            feature_len: features.len(),
            x: train_rows
                .iter()
                .map(|(row, _)| row.feature_vector(&features))
                .collect(),
            y: train_rows.iter().map(|(_, y)| *y).collect(),
        };
        let options = hyperparameters.train_options();
        info!(
            "Training {} on {} rows ({} holdout), {} estimators, features [{}]",
            target,
            train_len,
            holdout_len,
            options.rounds,
            join_columns(&features)
        );
        let regressor = train_gbdt_stump(&dataset, &options).map_err(TrainingError::Fit)?;

        let holdout_x: Vec<Vec<f64>> = holdout_rows
            .iter()
            .map(|(row, _)| row.feature_vector(&features))
            .collect();
        let holdout_y: Vec<f64> = holdout_rows.iter().map(|(_, y)| *y).collect();
        let holdout = RegressionMetrics::evaluate(&holdout_y, &regressor.predict_many(&holdout_x));

        let model_id = ModelStore::model_id_at(created)?;
        let created_at = created
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(super::StoreError::from)?;
        let model = PersistedModel {
            model_id: model_id.clone(),
            created_at,
            target,
            features: features.clone(),
            algorithm: Algorithm::GradientBoosting,
            hyperparameters: hyperparameters.clone(),
            holdout,
            train_rows: train_len,
            regressor,
        };
        let model_path = self.store.save(&model)?;
        info!(
            "Saved model {} (holdout RMSE {:.4}) to {}",
            model_id,
            holdout.rmse,
            model_path.display()
        );
        Ok(TrainingResult {
            rmse: holdout.rmse,
            model_id,
            features_used: features,
            train_rows: train_len,
            holdout_rows: holdout_len,
            model_path,
        })
    }
}

fn dedup_features(features: &[Column]) -> Vec<Column> {
    let mut out = Vec::with_capacity(features.len());
    for &column in features {
        if !out.contains(&column) {
            out.push(column);
        }
    }
    out
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|column| column.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
