use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything the Overview tab and the report need from one forecast.
///
/// When `error` is set every series and map is empty and the score is 0, so
/// consumers can render it without special-casing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub historical_x: Vec<f64>,
    pub historical_y: Vec<f64>,
    pub predicted_x: Vec<f64>,
    pub predicted_y: Vec<f64>,
    pub next_quarter_prediction: String,
    pub model_performance: BTreeMap<String, String>,
    /// Percent of total split gain per feature name.
    pub feature_weights: BTreeMap<String, f64>,
    pub data_quality_score: f64,
    pub error: Option<String>,
}

impl ForecastPayload {
    /// Empty payload tagged with an error message.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_series(&self) -> bool {
        !self.historical_y.is_empty() || !self.predicted_y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_is_empty() {
        let payload = ForecastPayload::with_error("no trained model");
        assert!(payload.is_degraded());
        assert!(!payload.has_series());
        assert!(payload.model_performance.is_empty());
        assert!(payload.feature_weights.is_empty());
        assert_eq!(payload.data_quality_score, 0.0);
        assert_eq!(payload.next_quarter_prediction, "");
    }
}
