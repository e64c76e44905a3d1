//! Shared state types for the egui dashboard.

mod progress;
mod reports;
mod status;
mod training;

pub use progress::*;
pub use reports::*;
pub use status::*;
pub use training::*;

use std::time::Instant;

use image::RgbImage;

use crate::config::TrainingSettings;
use crate::forecast::ForecastPayload;

/// Top-level dashboard tabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Overview,
    Prediction,
    Reports,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Overview,
        DashboardTab::Prediction,
        DashboardTab::Reports,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardTab::Overview => "Overview",
            DashboardTab::Prediction => "Prediction",
            DashboardTab::Reports => "Reports",
        }
    }
}

/// Latest forecast shown on the Overview tab.
#[derive(Clone, Debug, Default)]
pub struct OverviewState {
    pub payload: ForecastPayload,
    /// Chart rendered off-thread for `payload`; `None` when nothing is plotted.
    pub chart: Option<RgbImage>,
    /// Bumped whenever `payload` changes so the chart texture is rebuilt.
    pub revision: u64,
    pub refreshed_at: Option<Instant>,
    /// A forecast job is computing the next payload.
    pub refreshing: bool,
}

impl OverviewState {
    pub fn set_payload(&mut self, payload: ForecastPayload, chart: Option<RgbImage>) {
        self.payload = payload;
        self.chart = chart;
        self.revision += 1;
        self.refreshed_at = Some(Instant::now());
    }

    /// KPI headline; a dash while no forecast is available.
    pub fn kpi_text(&self) -> &str {
        if self.payload.is_degraded() || self.payload.next_quarter_prediction.is_empty() {
            "-"
        } else {
            &self.payload.next_quarter_prediction
        }
    }

    pub fn quality_text(&self) -> String {
        format!("{:.0}%", self.payload.data_quality_score)
    }
}

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    pub tab: DashboardTab,
    pub status: StatusBarState,
    pub progress: ProgressOverlayState,
    pub overview: OverviewState,
    pub training: TrainingPanelState,
    pub reports: ReportsState,
}

impl UiState {
    pub fn new(training: &TrainingSettings) -> Self {
        Self {
            tab: DashboardTab::default(),
            status: StatusBarState::idle(),
            progress: ProgressOverlayState::default(),
            overview: OverviewState::default(),
            training: TrainingPanelState::new(training.n_estimators, training.learning_rate),
            reports: ReportsState::default(),
        }
    }
}
