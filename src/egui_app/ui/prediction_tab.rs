use super::style;
use super::*;
use crate::egui_app::state::{
    MAX_ESTIMATORS, MAX_LEARNING_RATE, MIN_ESTIMATORS, MIN_LEARNING_RATE,
};
use crate::forecast::Algorithm;
use eframe::egui::{ProgressBar, RichText};

impl EguiApp {
    pub(super) fn render_prediction(&mut self, ui: &mut egui::Ui) {
        let busy = self.controller.ui.training.retrain_in_progress;
        ui.columns(2, |columns| {
            columns[0].add_enabled_ui(!busy, |ui| {
                self.render_feature_picker(ui);
                ui.add_space(8.0);
                self.render_hyperparameters(ui);
            });
            self.render_training_summary(&mut columns[1]);
        });
    }

    fn render_feature_picker(&mut self, ui: &mut egui::Ui) {
        let panel = &mut self.controller.ui.training;
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Feature Selection").strong());
            ui.add(egui::TextEdit::singleline(&mut panel.search).hint_text("Search features..."));
            ui.add_space(4.0);
            egui::ScrollArea::vertical()
                .id_salt("feature_picker_scroll")
                .max_height(220.0)
                .show(ui, |ui| {
                    for index in panel.visible_features() {
                        let choice = &mut panel.features[index];
                        ui.checkbox(&mut choice.selected, choice.column.as_str());
                    }
                });
        });
    }

    fn render_hyperparameters(&mut self, ui: &mut egui::Ui) {
        let panel = &mut self.controller.ui.training;
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Algorithm").strong());
            egui::ComboBox::from_id_salt("algorithm_combo")
                .selected_text(panel.algorithm.label())
                .show_ui(ui, |ui| {
                    let algorithm = Algorithm::GradientBoosting;
                    ui.selectable_value(&mut panel.algorithm, algorithm, algorithm.label());
                });
            ui.add_space(6.0);
            ui.label(RichText::new("Hyperparameters").strong());
            ui.add(
                egui::Slider::new(&mut panel.n_estimators, MIN_ESTIMATORS..=MAX_ESTIMATORS)
                    .text("n_estimators"),
            );
            ui.add(
                egui::Slider::new(
                    &mut panel.learning_rate,
                    MIN_LEARNING_RATE..=MAX_LEARNING_RATE,
                )
                .logarithmic(true)
                .text("learning_rate"),
            );
        });
    }

    fn render_training_summary(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let busy = self.controller.ui.training.retrain_in_progress;
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Model Retraining").strong());
            ui.add_space(4.0);
            let progress = &self.controller.ui.progress;
            let label = self.controller.ui.training.progress_label.clone();
            let fraction = if busy {
                progress.fraction()
            } else if label == "Completed" {
                1.0
            } else {
                0.0
            };
            ui.add(ProgressBar::new(fraction).text(label));
            ui.add_space(8.0);
            let panel = &self.controller.ui.training;
            egui::Grid::new("training_summary_grid")
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label("Training Progress");
                    ui.label(if panel.progress_label.is_empty() {
                        "-"
                    } else {
                        panel.progress_label.as_str()
                    });
                    ui.end_row();
                    ui.label("Achieved Accuracy");
                    ui.label(
                        panel
                            .last_result
                            .as_ref()
                            .map(|result| format!("RMSE {:.2}", result.rmse))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    ui.end_row();
                    ui.label("Model ID");
                    ui.label(
                        panel
                            .last_result
                            .as_ref()
                            .map(|result| result.model_id.clone())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    ui.end_row();
                });
            if let Some(error) = self.controller.ui.training.last_error.as_deref() {
                ui.add_space(6.0);
                ui.label(RichText::new(error).color(palette.caution));
            }
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!busy, egui::Button::new("RETRAIN MODEL"))
                    .clicked()
                {
                    self.controller.begin_training();
                }
                if ui
                    .add_enabled(busy, egui::Button::new("CANCEL TRAINING"))
                    .clicked()
                {
                    self.controller.cancel_training();
                }
            });
        });
    }
}
