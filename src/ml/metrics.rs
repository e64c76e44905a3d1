//! Evaluation metrics for regression models.

use serde::{Deserialize, Serialize};

/// Holdout evaluation snapshot stored alongside a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// Coefficient of determination; 0 when the truth has no variance.
    pub r2: f64,
    /// Number of rows evaluated.
    pub support: usize,
}

impl RegressionMetrics {
    /// Evaluate predictions against aligned truth values.
    pub fn evaluate(truth: &[f64], predicted: &[f64]) -> Self {
        Self {
            rmse: rmse(truth, predicted),
            mae: mae(truth, predicted),
            r2: r2(truth, predicted),
            support: truth.len().min(predicted.len()),
        }
    }
}

/// Root-mean-squared error; 0 for empty input.
pub fn rmse(truth: &[f64], predicted: &[f64]) -> f64 {
    mean_of(truth, predicted, |err| err * err).sqrt()
}

/// Mean absolute error; 0 for empty input.
pub fn mae(truth: &[f64], predicted: &[f64]) -> f64 {
    mean_of(truth, predicted, f64::abs)
}

/// Coefficient of determination.
pub fn r2(truth: &[f64], predicted: &[f64]) -> f64 {
    let n = truth.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let mean = truth[..n].iter().sum::<f64>() / n as f64;
    let total: f64 = truth[..n].iter().map(|t| (t - mean).powi(2)).sum();
    if total == 0.0 {
        return 0.0;
    }
    let residual: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    1.0 - residual / total
}

fn mean_of(truth: &[f64], predicted: &[f64], f: impl Fn(f64) -> f64) -> f64 {
    let n = truth.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| f(t - p))
        .sum::<f64>()
        / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_zero_error() {
        let truth = [1.0, 2.0, 3.0];
        let metrics = RegressionMetrics::evaluate(&truth, &truth);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.support, 3);
    }

    #[test]
    fn rmse_and_mae_match_hand_computation() {
        let truth = [0.0, 0.0];
        let predicted = [3.0, -4.0];
        assert!((rmse(&truth, &predicted) - 12.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(mae(&truth, &predicted), 3.5);
        assert_eq!(r2(&truth, &predicted), 0.0);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(rmse(&[], &[]), 0.0);
        assert_eq!(mae(&[], &[]), 0.0);
    }
}
