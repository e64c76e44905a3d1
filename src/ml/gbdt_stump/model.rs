use serde::{Deserialize, Serialize};

/// Current on-disk model format version.
pub const MODEL_VERSION: i64 = 1;

/// Single-node decision tree used as a weak learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    /// Feature index used for the split.
    pub feature_index: u16,
    /// Threshold in feature units.
    pub threshold: f64,
    /// Prediction for `feature <= threshold`.
    pub left_value: f64,
    /// Prediction for `feature > threshold` (and for NaN features).
    pub right_value: f64,
    /// Squared-error reduction achieved by this split during training.
    #[serde(default)]
    pub gain: f64,
}

impl Stump {
    /// Predict the stump value for a feature vector.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let value = features
            .get(self.feature_index as usize)
            .copied()
            .unwrap_or(0.0);
        if value <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Gradient-boosted decision stump model for scalar regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtStumpRegressor {
    /// Model format version.
    pub model_version: i64,
    /// Number of values per feature vector.
    pub feature_len: usize,
    /// Learning rate applied to each stump prediction.
    pub learning_rate: f64,
    /// Starting prediction (training target mean).
    pub init_value: f64,
    /// One stump per boosting round.
    pub stumps: Vec<Stump>,
}

impl GbdtStumpRegressor {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != MODEL_VERSION {
            return Err(format!(
                "Unsupported model_version {} (expected {MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.feature_len == 0 {
            return Err("Model must use at least one feature".to_string());
        }
        if !self.init_value.is_finite() || !self.learning_rate.is_finite() {
            return Err("Model init_value and learning_rate must be finite".to_string());
        }
        for (round, stump) in self.stumps.iter().enumerate() {
            if stump.feature_index as usize >= self.feature_len {
                return Err(format!(
                    "Round {round} splits on feature {} but model has {}",
                    stump.feature_index, self.feature_len
                ));
            }
            if !(stump.threshold.is_finite()
                && stump.left_value.is_finite()
                && stump.right_value.is_finite())
            {
                return Err(format!("Round {round} has non-finite split values"));
            }
        }
        Ok(())
    }

    /// Predict the target for a feature vector.
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.stumps
            .iter()
            .fold(self.init_value, |acc, stump| {
                acc + self.learning_rate * stump.predict(features)
            })
    }

    /// Predict every row of a feature matrix.
    pub fn predict_many(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Total split gain attributed to each feature index.
    pub fn feature_gains(&self) -> Vec<f64> {
        let mut gains = vec![0.0; self.feature_len];
        for stump in &self.stumps {
            if let Some(slot) = gains.get_mut(stump.feature_index as usize) {
                *slot += stump.gain.max(0.0);
            }
        }
        gains
    }
}
