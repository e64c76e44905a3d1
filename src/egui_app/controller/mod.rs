//! Dashboard controller: owns UI state and the background job runners.
//!
//! All state mutation happens on the UI thread inside controller methods;
//! workers only talk back through their job channels, drained by
//! [`DashboardController::poll_background_jobs`].

mod background_jobs;
mod model_training;
mod overview;
mod reports;

use std::path::{Path, PathBuf};

use crate::config::{self, AppSettings, ConfigError};
use crate::egui_app::state::{StatusTone, UiState};
use crate::forecast::{ModelStore, Predictor, Trainer, TrainingResult};
use crate::jobs::{ForecastView, JobRunner};

/// Job runners and the report currently being written.
#[derive(Debug)]
struct ControllerRuntime {
    training: JobRunner<TrainingResult>,
    reports: JobRunner<PathBuf>,
    forecast: JobRunner<ForecastView>,
    active_report: Option<String>,
    /// A refresh was requested while the forecast runner was busy.
    forecast_pending: bool,
}

/// Drives the dashboard UI.
#[derive(Debug)]
pub struct DashboardController {
    pub ui: UiState,
    settings: AppSettings,
    data_path: PathBuf,
    reports_dir: PathBuf,
    trainer: Trainer,
    predictor: Predictor,
    runtime: ControllerRuntime,
    persist_settings: bool,
}

impl DashboardController {
    /// Build a controller from persisted settings, resolving app directories.
    pub fn new(settings: AppSettings) -> Result<Self, ConfigError> {
        let settings = settings.normalized();
        let models_dir = settings.resolved_models_dir()?;
        let reports_dir = settings.resolved_reports_dir()?;
        let data_path = settings.data_path.clone();
        let mut controller = Self::with_paths(settings, data_path, models_dir, reports_dir);
        controller.persist_settings = true;
        Ok(controller)
    }

    /// Build a controller with explicit locations. Settings changes are not saved.
    pub fn with_paths(
        settings: AppSettings,
        data_path: impl Into<PathBuf>,
        models_dir: impl Into<PathBuf>,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        let settings = settings.normalized();
        let data_path = data_path.into();
        let store = ModelStore::new(models_dir);
        let timeout = settings.job_timeout();
        Self {
            ui: UiState::new(&settings.training),
            data_path: data_path.clone(),
            reports_dir: reports_dir.into(),
            trainer: Trainer::new(store.clone()),
            predictor: Predictor::new(store, data_path),
            runtime: ControllerRuntime {
                training: JobRunner::new("training").with_timeout(timeout),
                reports: JobRunner::new("report").with_timeout(timeout),
                forecast: JobRunner::new("forecast").with_timeout(timeout),
                active_report: None,
                forecast_pending: false,
            },
            settings,
            persist_settings: false,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn models_dir(&self) -> &Path {
        self.trainer.store().dir()
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// True while any worker thread is alive or a refresh is queued; the UI
    /// keeps repainting then.
    pub fn has_active_jobs(&self) -> bool {
        self.runtime.training.is_busy()
            || self.runtime.reports.is_busy()
            || self.runtime.forecast.is_busy()
            || self.runtime.forecast_pending
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status.set(text, tone);
    }

    fn save_settings(&mut self) {
        if !self.persist_settings {
            return;
        }
        if let Err(err) = config::save(&self.settings) {
            self.set_status(format!("Failed to save settings: {err}"), StatusTone::Warning);
        }
    }
}
