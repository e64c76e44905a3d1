use super::style;
use super::*;
use crate::egui_app::state::ReportStatus;
use eframe::egui::RichText;

impl EguiApp {
    pub(super) fn render_reports(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let generating = self.controller.ui.reports.generation_in_progress;
        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Historical Performance Reports").strong());
            ui.label(
                RichText::new(format!("Saved to {}", self.controller.reports_dir().display()))
                    .color(palette.text_muted),
            );
            ui.add_space(6.0);
            let label = if generating {
                "Generating..."
            } else {
                "Generate New Report"
            };
            if ui
                .add_enabled(!generating, egui::Button::new(label))
                .clicked()
            {
                self.controller.begin_report();
            }
        });
        ui.add_space(8.0);
        let mut open_index = None;
        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Generated Reports").strong());
            ui.add_space(4.0);
            let entries = &self.controller.ui.reports.entries;
            if entries.is_empty() {
                ui.label(RichText::new("No reports generated yet").color(palette.text_muted));
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt("generated_reports_scroll")
                .show(ui, |ui| {
                    for (index, entry) in entries.iter().enumerate() {
                        ui.push_id(&entry.name, |ui| {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    ui.label(&entry.name);
                                    ui.label(
                                        RichText::new(format!("Date: {}", entry.created_on))
                                            .color(palette.text_muted),
                                    );
                                });
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        let view = ui.add_enabled(
                                            entry.status == ReportStatus::Completed,
                                            egui::Button::new("View"),
                                        );
                                        if view.clicked() {
                                            open_index = Some(index);
                                        }
                                        let color = match entry.status {
                                            ReportStatus::InProgress => palette.highlight,
                                            ReportStatus::Completed => palette.positive,
                                            ReportStatus::Failed => palette.caution,
                                        };
                                        let status = ui.label(
                                            RichText::new(entry.status.label()).color(color),
                                        );
                                        if let Some(error) = entry.error.as_deref() {
                                            status.on_hover_text(error);
                                        }
                                    },
                                );
                            });
                            ui.separator();
                        });
                    }
                });
        });
        if let Some(index) = open_index {
            self.controller.open_report(index);
        }
    }
}
