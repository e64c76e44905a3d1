use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::model_store::{LatestModel, ModelStore, PersistedModel};
use super::payload::ForecastPayload;
use crate::dataset::{FeatureRow, add_months, data_quality_score, load_features};

/// Number of monthly periods forecast past the last historical row.
pub const FORECAST_HORIZON: usize = 6;
/// Multiplier applied to mean historical marketing spend for future rows.
pub const SPEND_UPLIFT: f64 = 1.1;

pub const NO_MODEL: &str = "no trained model";
pub const CORRUPT_MODEL: &str = "corrupt model";
pub const NO_DATA: &str = "historical data unavailable";

/// Produces forecasts from the newest persisted model.
#[derive(Debug, Clone)]
pub struct Predictor {
    store: ModelStore,
    data_path: PathBuf,
}

impl Predictor {
    pub fn new(store: ModelStore, data_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_path: data_path.into(),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Forecast with the newest model. Never fails: problems become `error`.
    pub fn predict_latest(&self) -> ForecastPayload {
        let model = match self.store.load_latest() {
            LatestModel::Loaded(model) => model,
            LatestModel::Missing => {
                debug!("No model in {}", self.store.dir().display());
                return ForecastPayload::with_error(NO_MODEL);
            }
            LatestModel::Corrupt { model_id, reason } => {
                warn!("Model {model_id} is unusable: {reason}");
                return ForecastPayload::with_error(CORRUPT_MODEL);
            }
        };
        let history = match load_features(&self.data_path) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("Historical data unavailable: {err}");
                return ForecastPayload::with_error(NO_DATA);
            }
        };
        forecast_from(&model, &history)
    }
}

/// Build the forecast payload for `model` over `history`.
pub fn forecast_from(model: &PersistedModel, history: &[FeatureRow]) -> ForecastPayload {
    let future = future_rows(history, FORECAST_HORIZON);
    if future.is_empty() {
        return ForecastPayload::with_error(NO_DATA);
    }
    let historical_y: Vec<f64> = history
        .iter()
        .filter_map(|row| row.value(model.target))
        .collect();
    let n = historical_y.len();
    let future_x: Vec<Vec<f64>> = future
        .iter()
        .map(|row| row.feature_vector(&model.features))
        .collect();
    let predicted_y = model.regressor.predict_many(&future_x);

    ForecastPayload {
        historical_x: (0..n).map(|i| i as f64).collect(),
        historical_y,
        predicted_x: (n..n + predicted_y.len()).map(|i| i as f64).collect(),
        next_quarter_prediction: format_compact(predicted_y.iter().take(3).sum()),
        predicted_y,
        model_performance: model_performance(model),
        feature_weights: feature_weights(model),
        data_quality_score: data_quality_score(history),
        error: None,
    }
}

/// Monthly rows following the last history row, with uplifted mean spend.
///
/// Empty when `history` is empty.
pub fn future_rows(history: &[FeatureRow], horizon: usize) -> Vec<FeatureRow> {
    let Some(last) = history.iter().map(FeatureRow::date).max() else {
        return Vec::new();
    };
    let spends: Vec<f64> = history
        .iter()
        .map(FeatureRow::marketing_spend)
        .filter(|v| v.is_finite())
        .collect();
    let mean_spend = if spends.is_empty() {
        0.0
    } else {
        spends.iter().sum::<f64>() / spends.len() as f64
    };
    (1..=horizon as i32)
        .filter_map(|offset| add_months(last, offset))
        .map(|date| FeatureRow::future(date, mean_spend * SPEND_UPLIFT))
        .collect()
}

/// Compact magnitude: `12.3M`, `45.6K` or `789.0`.
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.1}")
    }
}

fn model_performance(model: &PersistedModel) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Model ID".to_string(), model.model_id.clone()),
        ("RMSE".to_string(), format!("{:.2}", model.holdout.rmse)),
        ("MAE".to_string(), format!("{:.2}", model.holdout.mae)),
        ("R²".to_string(), format!("{:.3}", model.holdout.r2)),
        (
            "Estimators".to_string(),
            model.regressor.stumps.len().to_string(),
        ),
        ("Trained".to_string(), model.created_at.clone()),
    ])
}

fn feature_weights(model: &PersistedModel) -> BTreeMap<String, f64> {
    let gains = model.regressor.feature_gains();
    let total: f64 = gains.iter().sum();
    model
        .features
        .iter()
        .zip(gains)
        .map(|(column, gain)| {
            let share = if total > 0.0 { gain / total * 100.0 } else { 0.0 };
            (column.as_str().to_string(), share)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::model_store::tests::sample_model;
    use tempfile::tempdir;
    use time::macros::date;

    fn history() -> Vec<FeatureRow> {
        vec![
            FeatureRow::new(date!(2024 - 01 - 31), 40.0, true, Some(100.0)),
            FeatureRow::new(date!(2024 - 02 - 29), 60.0, false, Some(120.0)),
            FeatureRow::new(date!(2024 - 03 - 31), 50.0, false, Some(110.0)),
        ]
    }

    #[test]
    fn future_rows_follow_last_month_with_uplift() {
        let rows = future_rows(&history(), FORECAST_HORIZON);
        let dates: Vec<_> = rows.iter().map(FeatureRow::date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 04 - 30),
                date!(2024 - 05 - 31),
                date!(2024 - 06 - 30),
                date!(2024 - 07 - 31),
                date!(2024 - 08 - 31),
                date!(2024 - 09 - 30),
            ]
        );
        assert!(rows.iter().all(|row| (row.marketing_spend() - 55.0).abs() < 1e-9));
        assert!(rows[1].is_holiday() && rows[3].is_holiday());
        assert!(!rows[0].is_holiday());
        assert!(future_rows(&[], 6).is_empty());
    }

    #[test]
    fn payload_series_are_contiguous() {
        let payload = forecast_from(&sample_model("sales_model_20240101-000000"), &history());
        assert_eq!(payload.error, None);
        assert_eq!(payload.historical_x, vec![0.0, 1.0, 2.0]);
        assert_eq!(payload.historical_y, vec![100.0, 120.0, 110.0]);
        assert_eq!(payload.predicted_x, vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        // Spend 55 > threshold 50: 100 + 0.1 * 10.
        assert!(payload.predicted_y.iter().all(|y| (y - 101.0).abs() < 1e-9));
        assert_eq!(payload.next_quarter_prediction, "303.0");
        assert_eq!(payload.feature_weights["MarketingSpend"], 100.0);
        assert_eq!(payload.feature_weights["Month"], 0.0);
        assert_eq!(payload.model_performance["RMSE"], "1.50");
        assert_eq!(payload.data_quality_score, 100.0);
    }

    #[test]
    fn compact_format_uses_suffixes() {
        assert_eq!(format_compact(12_345_678.0), "12.3M");
        assert_eq!(format_compact(45_600.0), "45.6K");
        assert_eq!(format_compact(789.0), "789.0");
    }

    #[test]
    fn missing_and_corrupt_models_degrade() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"));
        let data = dir.path().join("sales.csv");
        let predictor = Predictor::new(store.clone(), &data);
        assert_eq!(predictor.predict_latest(), ForecastPayload::with_error(NO_MODEL));

        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_for("sales_model_20240101-000000"), b"not json").unwrap();
        assert_eq!(predictor.predict_latest(), ForecastPayload::with_error(CORRUPT_MODEL));
    }

    #[test]
    fn missing_history_degrades() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        store.save(&sample_model("sales_model_20240101-000000")).unwrap();
        let predictor = Predictor::new(store, dir.path().join("absent.csv"));
        assert_eq!(predictor.predict_latest(), ForecastPayload::with_error(NO_DATA));
    }
}
