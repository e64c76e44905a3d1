use tracing::{info, warn};

use super::DashboardController;
use crate::egui_app::state::{
    ProgressOverlayState, ProgressTaskKind, ReportEntry, ReportStatus, StatusTone,
};
use crate::forecast::{ReportJob, local_now};
use crate::jobs::run_report;
use crate::report::{report_name_at, report_path};

impl DashboardController {
    /// Start writing a new timestamped report. False if rejected.
    pub fn begin_report(&mut self) -> bool {
        let now = local_now();
        let name = match report_name_at(now) {
            Ok(name) => name,
            Err(err) => {
                self.set_status(format!("Report not started: {err}"), StatusTone::Error);
                return false;
            }
        };
        let output_path = report_path(&self.reports_dir, &name);
        let job = ReportJob {
            output_path: output_path.clone(),
            report_name: name.clone(),
        };
        let predictor = self.predictor.clone();
        let submitted = self
            .runtime
            .reports
            .submit(move |ctx| run_report(ctx, &job, &predictor));
        if let Err(err) = submitted {
            warn!("Report rejected: {err}");
            self.set_status(format!("Report not started: {err}"), StatusTone::Warning);
            return false;
        }
        self.ui.reports.push(ReportEntry {
            name: name.clone(),
            path: output_path,
            created_on: now.date(),
            status: ReportStatus::InProgress,
            error: None,
        });
        self.ui.reports.generation_in_progress = true;
        self.runtime.active_report = Some(name.clone());
        if !self.ui.progress.visible {
            self.ui.progress =
                ProgressOverlayState::new(ProgressTaskKind::Report, "Generating report", false);
        }
        self.set_status(format!("Generating {name}"), StatusTone::Busy);
        true
    }

    /// Open a completed report with the system viewer.
    pub fn open_report(&mut self, index: usize) {
        let Some(entry) = self.ui.reports.entries.get(index) else {
            return;
        };
        let path = entry.path.clone();
        if !path.is_file() {
            self.set_status(
                format!("Report not found: {}", path.display()),
                StatusTone::Warning,
            );
            return;
        }
        info!("Opening report {}", path.display());
        if let Err(err) = open::that(&path) {
            self.set_status(format!("Failed to open report: {err}"), StatusTone::Error);
        }
    }
}
