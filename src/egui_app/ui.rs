//! egui renderer for the dashboard.
mod chrome;
mod overview_tab;
mod prediction_tab;
mod reports_tab;
mod style;

use std::time::Duration;

use eframe::egui::{self, TextureHandle};

use crate::config::AppSettings;
use crate::egui_app::controller::DashboardController;
use crate::egui_app::state::DashboardTab;

/// Smallest window the dashboard lays out sensibly in.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(960.0, 640.0);

const JOB_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Renders the dashboard using the shared controller state.
pub struct EguiApp {
    controller: DashboardController,
    visuals_set: bool,
    chart_tex: Option<TextureHandle>,
    chart_revision: Option<u64>,
}

impl EguiApp {
    /// Create the app and compute the initial forecast.
    pub fn new(settings: AppSettings) -> Result<Self, String> {
        let mut controller = DashboardController::new(settings)
            .map_err(|err| format!("Failed to resolve app directories: {err}"))?;
        controller.refresh_overview();
        Ok(Self {
            controller,
            visuals_set: false,
            chart_tex: None,
            chart_revision: None,
        })
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.poll_background_jobs();
        self.render_top_bar(ctx);
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.controller.ui.tab {
            DashboardTab::Overview => self.render_overview(ui),
            DashboardTab::Prediction => self.render_prediction(ui),
            DashboardTab::Reports => self.render_reports(ui),
        });
        if self.controller.has_active_jobs() {
            ctx.request_repaint_after(JOB_REPAINT_INTERVAL);
        }
    }
}
