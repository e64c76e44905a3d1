use std::path::PathBuf;

use rfd::FileDialog;
use tracing::{info, warn};

use super::DashboardController;
use crate::egui_app::state::StatusTone;
use crate::forecast::{ForecastPayload, Predictor};
use crate::jobs::{ForecastView, JobEvent, run_forecast};

impl DashboardController {
    /// Recompute the forecast shown on the Overview tab off the UI thread.
    ///
    /// A request made while a forecast is still running is queued and
    /// submitted once that run finishes.
    pub fn refresh_overview(&mut self) {
        if self.runtime.forecast.is_busy() {
            self.runtime.forecast_pending = true;
            return;
        }
        self.runtime.forecast_pending = false;
        let predictor = self.predictor.clone();
        match self
            .runtime
            .forecast
            .submit(move |ctx| run_forecast(ctx, &predictor))
        {
            Ok(_) => self.ui.overview.refreshing = true,
            Err(err) => {
                warn!("Forecast refresh rejected: {err}");
                self.set_status(format!("Forecast not started: {err}"), StatusTone::Error);
            }
        }
    }

    /// Apply a finished forecast job to the Overview tab.
    pub(super) fn apply_forecast_event(&mut self, event: JobEvent<ForecastView>) {
        let JobEvent::Completed(result) = event else {
            return;
        };
        self.ui.overview.refreshing = false;
        match result {
            Ok(view) => {
                match view.payload.error.as_deref() {
                    Some(error) => self.set_status(
                        format!("Forecast unavailable: {error}"),
                        StatusTone::Warning,
                    ),
                    None => self.set_status(
                        format!(
                            "Forecast updated: next quarter {}",
                            view.payload.next_quarter_prediction
                        ),
                        StatusTone::Info,
                    ),
                }
                self.ui.overview.set_payload(view.payload, view.chart);
            }
            Err(err) => {
                self.set_status(format!("Forecast failed: {err}"), StatusTone::Error);
                self.ui
                    .overview
                    .set_payload(ForecastPayload::with_error(err.to_string()), None);
            }
        }
    }

    /// Ask the user for a historical sales CSV and switch to it.
    pub fn choose_data_file(&mut self) {
        let mut dialog = FileDialog::new().add_filter("CSV", &["csv"]);
        if let Some(dir) = self.data_path.parent().filter(|dir| dir.is_dir()) {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.set_data_path(path);
        }
    }

    /// Point the dashboard at a different history file and refresh.
    pub fn set_data_path(&mut self, path: PathBuf) {
        info!("Using historical data {}", path.display());
        self.data_path = path.clone();
        self.predictor = Predictor::new(self.trainer.store().clone(), path.clone());
        self.settings.data_path = path;
        self.save_settings();
        self.refresh_overview();
    }
}
