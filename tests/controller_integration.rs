mod support;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use support::{history::write_history_csv, salescast_env::SalescastEnvGuard};

use salescast::config::AppSettings;
use salescast::egui_app::controller::DashboardController;
use salescast::egui_app::state::{ReportStatus, StatusTone};
use salescast::forecast::NO_MODEL;
use salescast::report::{CHART_HEIGHT, CHART_WIDTH};
use tempfile::TempDir;

struct ControllerHarness {
    _temp: TempDir,
    controller: DashboardController,
}

impl ControllerHarness {
    fn new(months: usize) -> Self {
        let temp = tempfile::tempdir().expect("create tempdir");
        let reports = temp.path().join("reports");
        Self::with_reports_dir(temp, months, reports)
    }

    fn with_reports_dir(temp: TempDir, months: usize, reports: PathBuf) -> Self {
        let csv = temp.path().join("history.csv");
        write_history_csv(&csv, months);
        let controller = DashboardController::with_paths(
            AppSettings::default(),
            csv,
            temp.path().join("models"),
            reports,
        );
        Self {
            _temp: temp,
            controller,
        }
    }

    fn wait_until(&mut self, mut done: impl FnMut(&DashboardController) -> bool) {
        let started = Instant::now();
        while started.elapsed() < Duration::from_secs(30) {
            self.controller.poll_background_jobs();
            if done(&self.controller) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for background job");
    }

    fn wait_for_overview(&mut self, revision: u64) {
        self.wait_until(|controller| {
            let overview = &controller.ui.overview;
            !overview.refreshing && overview.revision >= revision
        });
    }
}

#[test]
fn overview_degrades_before_first_training() {
    let mut harness = ControllerHarness::new(24);
    harness.controller.refresh_overview();
    assert!(harness.controller.ui.overview.refreshing);
    assert_eq!(harness.controller.ui.overview.revision, 0);

    harness.wait_for_overview(1);
    let overview = &harness.controller.ui.overview;
    assert_eq!(overview.payload.error.as_deref(), Some(NO_MODEL));
    assert_eq!(overview.kpi_text(), "-");
    assert!(overview.chart.is_none());
    assert_eq!(overview.revision, 1);
    let (warning_label, _) = StatusTone::Warning.badge();
    assert_eq!(harness.controller.ui.status.badge_label, warning_label);
}

#[test]
fn retrain_updates_panel_and_overview() {
    let mut harness = ControllerHarness::new(36);
    harness.controller.ui.training.n_estimators = 1000;

    assert!(harness.controller.begin_training());
    assert!(harness.controller.ui.training.retrain_in_progress);
    assert!(!harness.controller.begin_training());

    harness.wait_until(|controller| !controller.ui.training.retrain_in_progress);
    let panel = &harness.controller.ui.training;
    assert_eq!(panel.progress_label, "Completed");
    let result = panel.last_result.as_ref().expect("training result");
    assert!(result.rmse >= 0.0);
    assert!(result.model_path.starts_with(harness.controller.models_dir()));
    assert!(!harness.controller.ui.progress.visible);

    harness.wait_for_overview(1);
    let overview = &harness.controller.ui.overview;
    assert!(overview.payload.error.is_none());
    assert_eq!(overview.payload.predicted_y.len(), 6);
    assert_ne!(overview.kpi_text(), "-");
    let chart = overview.chart.as_ref().expect("chart rendered off-thread");
    assert_eq!(
        (chart.width(), chart.height()),
        (CHART_WIDTH, CHART_HEIGHT)
    );
}

#[test]
fn overlapping_refreshes_settle_on_one_payload() {
    let mut harness = ControllerHarness::new(24);
    harness.controller.refresh_overview();
    harness.controller.refresh_overview();
    harness.wait_until(|controller| !controller.has_active_jobs());
    let overview = &harness.controller.ui.overview;
    assert!(!overview.refreshing);
    assert!((1..=2).contains(&overview.revision));
    assert_eq!(overview.payload.error.as_deref(), Some(NO_MODEL));
}

#[test]
fn cancel_reenables_panel_immediately() {
    let mut harness = ControllerHarness::new(36);
    harness.controller.ui.training.n_estimators = 1000;
    assert!(harness.controller.begin_training());
    harness.controller.cancel_training();

    let panel = &harness.controller.ui.training;
    assert!(!panel.retrain_in_progress);
    assert_eq!(panel.progress_label, "Cancelled");
    assert!(panel.last_result.is_none());

    harness.wait_until(|controller| !controller.has_active_jobs());
    assert_eq!(harness.controller.ui.training.progress_label, "Cancelled");
    assert!(harness.controller.ui.training.last_result.is_none());
}

#[test]
fn report_entry_completes_and_file_exists() {
    let mut harness = ControllerHarness::new(24);
    assert!(harness.controller.begin_report());
    let entry = &harness.controller.ui.reports.entries[0];
    assert_eq!(entry.status, ReportStatus::InProgress);
    assert!(entry.name.starts_with("Quarterly_Sales_Forecast_"));
    assert!(harness.controller.ui.reports.generation_in_progress);

    harness.wait_until(|controller| !controller.ui.reports.generation_in_progress);
    let entry = &harness.controller.ui.reports.entries[0];
    assert_eq!(entry.status, ReportStatus::Completed);
    assert!(entry.path.is_file());
    assert_eq!(
        entry.path.extension().and_then(|ext| ext.to_str()),
        Some("pdf")
    );
}

#[test]
fn unwritable_reports_dir_marks_entry_failed_without_file() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let blocker = temp.path().join("reports");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");
    let mut harness = ControllerHarness::with_reports_dir(temp, 24, blocker.clone());

    assert!(harness.controller.begin_report());
    harness.wait_until(|controller| !controller.has_active_jobs());

    let entry = &harness.controller.ui.reports.entries[0];
    assert_eq!(entry.status, ReportStatus::Failed);
    assert!(entry.error.is_some());
    assert!(!entry.path.exists());
    assert!(blocker.is_file());
    assert!(!harness.controller.ui.reports.generation_in_progress);
    let (error_label, _) = StatusTone::Error.badge();
    assert_eq!(harness.controller.ui.status.badge_label, error_label);
}

#[test]
fn new_controller_resolves_app_directories() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _env = SalescastEnvGuard::set_config_home(temp.path().to_path_buf());
    let controller = DashboardController::new(AppSettings::default()).expect("controller");
    assert!(controller.models_dir().starts_with(temp.path()));
    assert!(controller.reports_dir().starts_with(temp.path()));
    assert!(controller.models_dir().is_dir());
}
