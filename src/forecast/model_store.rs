use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use super::error::StoreError;
use super::{Algorithm, Hyperparameters};
use crate::dataset::Column;
use crate::ml::gbdt_stump::GbdtStumpRegressor;
use crate::ml::metrics::RegressionMetrics;

/// Filename prefix shared by every persisted model.
pub const MODEL_PREFIX: &str = "sales_model_";
/// Filename extension of persisted models.
pub const MODEL_EXTENSION: &str = "model";

const ID_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]-[hour][minute][second]");

/// Trained model artifact plus the metadata the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedModel {
    pub model_id: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    pub target: Column,
    /// Feature order expected by `regressor`.
    pub features: Vec<Column>,
    pub algorithm: Algorithm,
    pub hyperparameters: Hyperparameters,
    pub holdout: RegressionMetrics,
    pub train_rows: usize,
    pub regressor: GbdtStumpRegressor,
}

impl PersistedModel {
    fn validate(&self) -> Result<(), String> {
        self.regressor.validate()?;
        if self.features.len() != self.regressor.feature_len {
            return Err(format!(
                "Model lists {} features but regressor expects {}",
                self.features.len(),
                self.regressor.feature_len
            ));
        }
        Ok(())
    }
}

/// Result of looking up the newest model.
#[derive(Debug, Clone, PartialEq)]
pub enum LatestModel {
    /// The directory holds no `*.model` files (or does not exist).
    Missing,
    /// The newest file could not be read or decoded.
    Corrupt { model_id: String, reason: String },
    Loaded(Box<PersistedModel>),
}

/// Directory of `sales_model_<timestamp>.model` files.
///
/// Models are never mutated or deleted here. Ids have second resolution, so
/// two saves within the same second overwrite each other; the newest model is
/// found by scanning the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Model id for a creation time, e.g. `sales_model_20240131-235959`.
    pub fn model_id_at(created: OffsetDateTime) -> Result<String, StoreError> {
        Ok(format!("{MODEL_PREFIX}{}", created.format(ID_FORMAT)?))
    }

    pub fn path_for(&self, model_id: &str) -> PathBuf {
        self.dir.join(format!("{model_id}.{MODEL_EXTENSION}"))
    }

    /// Write a model atomically (temp file + rename), replacing any same-id file.
    pub fn save(&self, model: &PersistedModel) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(&model.model_id);
        let bytes = serde_json::to_vec_pretty(model).map_err(StoreError::Encode)?;
        let write_error = |source| StoreError::Write {
            path: path.clone(),
            source,
        };
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        temp.write_all(&bytes).map_err(write_error)?;
        temp.flush().map_err(write_error)?;
        temp.persist(&path).map_err(|err| write_error(err.error))?;
        Ok(path)
    }

    /// Ids of every `*.model` file, sorted ascending. A missing directory is empty.
    pub fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::ReadDir {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == MODEL_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Id whose filename sorts last, which is the newest for timestamped ids.
    pub fn latest_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.list_ids()?.pop())
    }

    pub fn load(&self, model_id: &str) -> Result<PersistedModel, StoreError> {
        let path = self.path_for(model_id);
        let bytes = std::fs::read(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let model: PersistedModel =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                path: path.clone(),
                source,
            })?;
        model
            .validate()
            .map_err(|reason| StoreError::Invalid { path, reason })?;
        Ok(model)
    }

    /// Load the newest model, classifying failures instead of returning them.
    pub fn load_latest(&self) -> LatestModel {
        let model_id = match self.latest_id() {
            Ok(Some(id)) => id,
            Ok(None) => return LatestModel::Missing,
            Err(err) => {
                tracing::warn!("Model lookup failed: {err}");
                return LatestModel::Missing;
            }
        };
        match self.load(&model_id) {
            Ok(model) => LatestModel::Loaded(Box::new(model)),
            Err(err) => LatestModel::Corrupt {
                model_id,
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ml::gbdt_stump::{MODEL_VERSION, Stump};
    use tempfile::tempdir;
    use time::macros::datetime;

    pub(crate) fn sample_model(model_id: &str) -> PersistedModel {
        PersistedModel {
            model_id: model_id.to_string(),
            created_at: "2024-01-31T23:59:59Z".to_string(),
            target: Column::Sales,
            features: vec![Column::Month, Column::MarketingSpend],
            algorithm: Algorithm::GradientBoosting,
            hyperparameters: Hyperparameters::default(),
            holdout: RegressionMetrics {
                rmse: 1.5,
                mae: 1.0,
                r2: 0.5,
                support: 3,
            },
            train_rows: 12,
            regressor: GbdtStumpRegressor {
                model_version: MODEL_VERSION,
                feature_len: 2,
                learning_rate: 0.1,
                init_value: 100.0,
                stumps: vec![Stump {
                    feature_index: 1,
                    threshold: 50.0,
                    left_value: -10.0,
                    right_value: 10.0,
                    gain: 4.0,
                }],
            },
        }
    }

    #[test]
    fn model_id_has_fixed_width_timestamp() {
        let id = ModelStore::model_id_at(datetime!(2024-03-05 07:08:09 UTC)).unwrap();
        assert_eq!(id, "sales_model_20240305-070809");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"));
        let model = sample_model("sales_model_20240101-000000");
        let path = store.save(&model).unwrap();
        assert_eq!(path, store.path_for(&model.model_id));
        assert_eq!(store.load(&model.model_id).unwrap(), model);
    }

    #[test]
    fn same_id_save_overwrites() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let mut model = sample_model("sales_model_20240101-000000");
        store.save(&model).unwrap();
        model.train_rows = 99;
        store.save(&model).unwrap();
        assert_eq!(store.list_ids().unwrap().len(), 1);
        assert_eq!(store.load(&model.model_id).unwrap().train_rows, 99);
    }

    #[test]
    fn latest_is_lexicographically_greatest_model_file() {
        let dir = tempdir().unwrap();
        for name in [
            "sales_model_20240101-000000.model",
            "sales_model_20241231-235959.model",
            "sales_model_20240615-120000.model",
            "zzz_notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"{}").unwrap();
        }
        let store = ModelStore::new(dir.path());
        assert_eq!(
            store.latest_id().unwrap().as_deref(),
            Some("sales_model_20241231-235959")
        );
    }

    #[test]
    fn missing_directory_has_no_models() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("absent"));
        assert_eq!(store.list_ids().unwrap(), Vec::<String>::new());
        assert_eq!(store.load_latest(), LatestModel::Missing);
    }

    #[test]
    fn truncated_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        store.save(&sample_model("sales_model_20240101-000000")).unwrap();
        let path = store.path_for("sales_model_20240101-000000");
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(store.load_latest(), LatestModel::Corrupt { .. }));
    }
}
