use super::style;
use super::*;
use crate::report::{CHART_HEIGHT, CHART_WIDTH};
use eframe::egui::{ColorImage, Frame, Margin, RichText, TextureOptions};

const KPI_PANEL_WIDTH: f32 = 240.0;

impl EguiApp {
    pub(super) fn render_overview(&mut self, ui: &mut egui::Ui) {
        self.sync_chart_texture(ui.ctx());
        let palette = style::palette();
        ui.horizontal_top(|ui| {
            let chart_width = (ui.available_width() - KPI_PANEL_WIDTH - 16.0).max(320.0);
            ui.vertical(|ui| {
                ui.set_width(chart_width);
                style::card_frame().show(ui, |ui| {
                    ui.label(RichText::new("Quarterly Sales Projections").strong());
                    ui.add_space(4.0);
                    self.render_chart(ui, chart_width - 12.0);
                });
            });
            ui.vertical(|ui| {
                ui.set_width(KPI_PANEL_WIDTH);
                style::card_frame().show(ui, |ui| {
                    ui.set_width(KPI_PANEL_WIDTH - 12.0);
                    ui.label(RichText::new("Prediction Summary").strong());
                    ui.add_space(8.0);
                    ui.label(RichText::new("NEXT QUARTER PREDICTION").color(palette.text_muted));
                    ui.label(
                        RichText::new(self.controller.ui.overview.kpi_text())
                            .size(32.0)
                            .color(palette.highlight),
                    );
                    if let Some(error) = self.controller.ui.overview.payload.error.as_deref() {
                        ui.add_space(6.0);
                        ui.label(RichText::new(error).color(palette.caution));
                    }
                });
            });
        });
        ui.add_space(8.0);
        ui.columns(3, |columns| {
            self.render_model_performance(&mut columns[0]);
            self.render_feature_weights(&mut columns[1]);
            self.render_data_quality(&mut columns[2]);
        });
    }

    fn sync_chart_texture(&mut self, ctx: &egui::Context) {
        let overview = &self.controller.ui.overview;
        if self.chart_revision == Some(overview.revision) {
            return;
        }
        self.chart_revision = Some(overview.revision);
        let Some(image) = overview.chart.as_ref() else {
            self.chart_tex = None;
            return;
        };
        let size = [image.width() as usize, image.height() as usize];
        let color_image = ColorImage::from_rgb(size, image.as_raw());
        match self.chart_tex.as_mut() {
            Some(tex) => tex.set(color_image, TextureOptions::LINEAR),
            None => {
                self.chart_tex =
                    Some(ctx.load_texture("forecast_chart", color_image, TextureOptions::LINEAR));
            }
        }
    }

    fn render_chart(&self, ui: &mut egui::Ui, width: f32) {
        let palette = style::palette();
        let height = width * CHART_HEIGHT as f32 / CHART_WIDTH as f32;
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
        match &self.chart_tex {
            Some(tex) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                ui.painter().image(tex.id(), rect, uv, egui::Color32::WHITE);
            }
            None => {
                ui.painter().rect_filled(rect, 0.0, palette.canvas);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    if self.controller.ui.overview.refreshing {
                        "Updating forecast..."
                    } else {
                        "No forecast available"
                    },
                    egui::FontId::proportional(16.0),
                    palette.text_muted,
                );
            }
        }
    }

    fn render_model_performance(&self, ui: &mut egui::Ui) {
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Model Performance").strong());
            egui::Grid::new("model_performance_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label(RichText::new("Metric").strong());
                    ui.label(RichText::new("Value").strong());
                    ui.end_row();
                    for (metric, value) in &self.controller.ui.overview.payload.model_performance {
                        ui.label(metric);
                        ui.label(value);
                        ui.end_row();
                    }
                });
        });
    }

    fn render_feature_weights(&self, ui: &mut egui::Ui) {
        let mut weights: Vec<_> = self
            .controller
            .ui
            .overview
            .payload
            .feature_weights
            .iter()
            .collect();
        weights.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Feature Weights").strong());
            egui::Grid::new("feature_weights_grid")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    ui.label(RichText::new("Feature").strong());
                    ui.label(RichText::new("Weight").strong());
                    ui.end_row();
                    for (feature, weight) in weights {
                        ui.label(feature);
                        ui.label(format!("{weight:.1}%"));
                        ui.end_row();
                    }
                });
        });
    }

    fn render_data_quality(&self, ui: &mut egui::Ui) {
        let palette = style::palette();
        style::card_frame().show(ui, |ui| {
            ui.label(RichText::new("Data Quality Score").strong());
            Frame::new()
                .inner_margin(Margin::symmetric(4, 8))
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(self.controller.ui.overview.quality_text())
                            .size(28.0)
                            .color(palette.positive),
                    );
                });
        });
    }
}
