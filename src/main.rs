#![deny(missing_docs)]

//! Entry point for the egui-based sales forecast dashboard.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use eframe::egui;
use salescast::config;
use salescast::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use salescast::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let settings = config::load_or_default();

    let viewport = egui::ViewportBuilder::default()
        .with_title("Sales Forecast Platform")
        .with_inner_size(egui::vec2(1280.0, 860.0))
        .with_min_inner_size(MIN_VIEWPORT_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Sales Forecast Platform",
        native_options,
        Box::new(move |_cc| {
            let app = settings
                .map_err(|err| format!("Failed to load config: {err}"))
                .and_then(EguiApp::new);
            match app {
                Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
                Err(err) => Ok(Box::new(LaunchError { message: err }) as Box<dyn eframe::App>),
            }
        }),
    )?;
    Ok(())
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start dashboard");
                ui.label(&self.message);
            });
        });
    }
}
