use std::collections::BTreeSet;

use crate::dataset::Column;
use crate::forecast::{Algorithm, Hyperparameters, TrainingJob, TrainingResult};

pub const MIN_ESTIMATORS: u32 = 100;
pub const MAX_ESTIMATORS: u32 = 1000;
pub const MIN_LEARNING_RATE: f64 = 0.01;
pub const MAX_LEARNING_RATE: f64 = 1.0;

/// One selectable feature checkbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureChoice {
    pub column: Column,
    pub selected: bool,
}

/// UI state for the Prediction / retrain tab.
#[derive(Clone, Debug)]
pub struct TrainingPanelState {
    pub features: Vec<FeatureChoice>,
    /// Case-insensitive filter applied to the feature list.
    pub search: String,
    pub algorithm: Algorithm,
    pub n_estimators: u32,
    pub learning_rate: f64,
    pub retrain_in_progress: bool,
    /// Label next to the progress bar ("Training Model... 45%", "Completed", ...).
    pub progress_label: String,
    pub last_result: Option<TrainingResult>,
    pub last_error: Option<String>,
}

impl TrainingPanelState {
    pub fn new(n_estimators: u32, learning_rate: f64) -> Self {
        let features = Column::ALL
            .into_iter()
            .filter(|column| *column != Column::Sales)
            .map(|column| FeatureChoice {
                column,
                selected: Column::DEFAULT_FEATURES.contains(&column),
            })
            .collect();
        Self {
            features,
            search: String::new(),
            algorithm: Algorithm::GradientBoosting,
            n_estimators: n_estimators.clamp(MIN_ESTIMATORS, MAX_ESTIMATORS),
            learning_rate: learning_rate.clamp(MIN_LEARNING_RATE, MAX_LEARNING_RATE),
            retrain_in_progress: false,
            progress_label: String::new(),
            last_result: None,
            last_error: None,
        }
    }

    /// Indices of features matching the search filter.
    pub fn visible_features(&self) -> Vec<usize> {
        let needle = self.search.trim().to_ascii_lowercase();
        self.features
            .iter()
            .enumerate()
            .filter(|(_, choice)| {
                needle.is_empty() || choice.column.as_str().to_ascii_lowercase().contains(&needle)
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn selected_columns(&self) -> BTreeSet<Column> {
        self.features
            .iter()
            .filter(|choice| choice.selected)
            .map(|choice| choice.column)
            .collect()
    }

    /// Snapshot the panel into an immutable job, on top of configured defaults.
    pub fn to_job(&self, defaults: &Hyperparameters) -> TrainingJob {
        TrainingJob {
            selected_features: self.selected_columns(),
            algorithm: self.algorithm,
            hyperparameters: defaults
                .clone()
                .with("n_estimators", f64::from(self.n_estimators))
                .with("learning_rate", self.learning_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_default_features_selected() {
        let panel = TrainingPanelState::new(50, 0.1);
        assert_eq!(panel.n_estimators, MIN_ESTIMATORS);
        assert_eq!(
            panel.selected_columns(),
            Column::DEFAULT_FEATURES.into_iter().collect()
        );
        assert!(panel.features.iter().all(|choice| choice.column != Column::Sales));
    }

    #[test]
    fn search_filters_feature_names() {
        let mut panel = TrainingPanelState::new(100, 0.1);
        panel.search = "OF".into();
        let names: Vec<_> = panel
            .visible_features()
            .into_iter()
            .map(|i| panel.features[i].column)
            .collect();
        assert_eq!(names, vec![Column::DayOfYear, Column::WeekOfYear]);
    }

    #[test]
    fn job_carries_slider_value() {
        let mut panel = TrainingPanelState::new(300, 0.05);
        panel.features[0].selected = false;
        let defaults = Hyperparameters::default()
            .with("learning_rate", 0.2)
            .with("bins", 16.0);
        let job = panel.to_job(&defaults);
        assert_eq!(job.hyperparameters.n_estimators(), 300);
        assert_eq!(job.hyperparameters.learning_rate(), 0.05);
        assert_eq!(job.hyperparameters.bins(), 16);
        assert!(!job.selected_features.contains(&Column::Year));
    }
}
