use std::path::PathBuf;

use super::DashboardController;
use crate::egui_app::state::{ProgressTaskKind, ReportStatus, StatusTone};
use crate::forecast::TrainingResult;
use crate::jobs::{JobError, JobEvent};

impl DashboardController {
    /// Drain job notifications and apply them to the UI state.
    pub fn poll_background_jobs(&mut self) {
        if self.ui.progress.cancel_requested {
            self.ui.progress.cancel_requested = false;
            if self.ui.progress.task == Some(ProgressTaskKind::Training) {
                self.cancel_training();
            }
        }
        for event in self.runtime.training.poll() {
            self.apply_training_event(event);
        }
        for event in self.runtime.reports.poll() {
            self.apply_report_event(event);
        }
        for event in self.runtime.forecast.poll() {
            self.apply_forecast_event(event);
        }
        if self.runtime.forecast_pending && !self.runtime.forecast.is_busy() {
            self.refresh_overview();
        }
    }

    fn apply_training_event(&mut self, event: JobEvent<TrainingResult>) {
        match event {
            JobEvent::Progress(percent) => {
                self.ui.training.progress_label = format!("Training Model... {percent}%");
                if self.ui.progress.is_for(ProgressTaskKind::Training) {
                    self.ui.progress.set_percent(percent);
                }
            }
            JobEvent::Completed(result) => {
                self.ui.training.retrain_in_progress = false;
                if self.ui.progress.is_for(ProgressTaskKind::Training) {
                    self.ui.progress.reset();
                }
                match result {
                    Ok(result) => {
                        self.ui.training.progress_label = "Completed".into();
                        self.set_status(
                            format!(
                                "Trained {} (holdout RMSE {:.2})",
                                result.model_id, result.rmse
                            ),
                            StatusTone::Info,
                        );
                        self.ui.training.last_result = Some(result);
                        self.refresh_overview();
                    }
                    Err(err) => {
                        self.ui.training.progress_label = "Failed".into();
                        self.set_status(format!("Training failed: {err}"), StatusTone::Error);
                        self.ui.training.last_error = Some(err.to_string());
                    }
                }
            }
        }
    }

    fn apply_report_event(&mut self, event: JobEvent<PathBuf>) {
        match event {
            JobEvent::Progress(percent) => {
                if self.ui.progress.is_for(ProgressTaskKind::Report) {
                    self.ui.progress.set_percent(percent);
                }
            }
            JobEvent::Completed(result) => {
                self.ui.reports.generation_in_progress = false;
                if self.ui.progress.is_for(ProgressTaskKind::Report) {
                    self.ui.progress.reset();
                }
                let Some(name) = self.runtime.active_report.take() else {
                    return;
                };
                match result {
                    Ok(path) => {
                        self.ui.reports.finish(&name, ReportStatus::Completed, None);
                        self.set_status(
                            format!("Report saved to {}", path.display()),
                            StatusTone::Info,
                        );
                    }
                    Err(err) => {
                        let message = match &err {
                            JobError::TimedOut(_) => format!("{err}; report discarded"),
                            _ => err.to_string(),
                        };
                        self.ui
                            .reports
                            .finish(&name, ReportStatus::Failed, Some(message.clone()));
                        self.set_status(format!("Report failed: {message}"), StatusTone::Error);
                    }
                }
            }
        }
    }
}
