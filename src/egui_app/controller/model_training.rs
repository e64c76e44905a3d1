use tracing::warn;

use super::DashboardController;
use crate::egui_app::state::{ProgressOverlayState, ProgressTaskKind, StatusTone};
use crate::jobs::run_training;

impl DashboardController {
    /// Snapshot the Prediction tab into a job and start it. False if rejected.
    pub fn begin_training(&mut self) -> bool {
        let job = self
            .ui
            .training
            .to_job(&self.settings.default_hyperparameters());
        let data_path = self.data_path.clone();
        let trainer = self.trainer.clone();
        let submitted = self
            .runtime
            .training
            .submit(move |ctx| run_training(ctx, &job, &data_path, &trainer));
        match submitted {
            Ok(_) => {
                let panel = &mut self.ui.training;
                panel.retrain_in_progress = true;
                panel.last_error = None;
                panel.progress_label = "Training Model... 0%".into();
                self.ui.progress =
                    ProgressOverlayState::new(ProgressTaskKind::Training, "Training model", true);
                self.set_status("Training started", StatusTone::Busy);
                true
            }
            Err(err) => {
                warn!("Training rejected: {err}");
                self.set_status(format!("Training not started: {err}"), StatusTone::Warning);
                false
            }
        }
    }

    /// Cancel the running training job. The UI is re-enabled immediately.
    pub fn cancel_training(&mut self) {
        if !self.runtime.training.cancel() {
            return;
        }
        let panel = &mut self.ui.training;
        panel.retrain_in_progress = false;
        panel.progress_label = "Cancelled".into();
        if self.ui.progress.is_for(ProgressTaskKind::Training) {
            self.ui.progress.reset();
        }
        self.set_status("Training cancelled", StatusTone::Warning);
    }
}
