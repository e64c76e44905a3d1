use super::style;
use super::*;
use crate::egui_app::state::ProgressTaskKind;
use eframe::egui::{ProgressBar, RichText, StrokeKind};

impl EguiApp {
    pub(super) fn render_top_bar(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("top_bar")
            .frame(style::bar_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Sales Forecast Platform")
                            .strong()
                            .color(palette.text),
                    );
                    ui.separator();
                    for tab in DashboardTab::ALL {
                        ui.selectable_value(&mut self.controller.ui.tab, tab, tab.label());
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Refresh").clicked() {
                            self.controller.refresh_overview();
                        }
                        if ui.button("Load data...").clicked() {
                            self.controller.choose_data_file();
                        }
                        let data_label = self.controller.data_path().display().to_string();
                        ui.label(RichText::new(data_label).color(palette.text_muted));
                    });
                });
            });
    }

    pub(super) fn render_status(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("status_bar")
            .frame(style::bar_frame())
            .show(ctx, |ui| {
                let status = self.controller.ui.status.clone();
                ui.horizontal(|ui| {
                    ui.add_space(6.0);
                    let (badge_rect, _) =
                        ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
                    ui.painter().rect_filled(badge_rect, 0.0, status.badge_color);
                    ui.painter().rect_stroke(
                        badge_rect,
                        0.0,
                        style::badge_border(),
                        StrokeKind::Inside,
                    );
                    ui.add_space(8.0);
                    ui.label(RichText::new(&status.badge_label).color(palette.text));
                    ui.separator();
                    ui.label(RichText::new(&status.text).color(palette.text))
                        .on_hover_text(status.log_text());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        self.render_inline_progress(ui);
                    });
                });
            });
    }

    fn render_inline_progress(&mut self, ui: &mut egui::Ui) {
        let progress = &mut self.controller.ui.progress;
        if !progress.visible {
            return;
        }
        if progress.cancelable {
            let canceling = progress.cancel_requested;
            let label = if canceling { "Canceling..." } else { "Cancel" };
            if ui.add_enabled(!canceling, egui::Button::new(label)).clicked() {
                progress.cancel_requested = true;
            }
        }
        let text = match progress.task {
            Some(ProgressTaskKind::Training) => format!("Training {}%", progress.percent),
            Some(ProgressTaskKind::Report) => format!("Report {}%", progress.percent),
            None => "Working...".to_string(),
        };
        ui.add(
            ProgressBar::new(progress.fraction())
                .desired_width(200.0)
                .text(text),
        );
        ui.label(&progress.title);
    }
}
