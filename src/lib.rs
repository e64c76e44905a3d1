//! Library exports for reuse in benchmarks, tools and tests.
/// Per-user application directories.
pub mod app_dirs;
/// Persisted application settings.
pub mod config;
/// Historical sales loading and calendar feature derivation.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Model training, persistence and forecasting.
pub mod forecast;
/// Background job runner for training and report generation.
pub mod jobs;
/// Logging setup for the app and command-line tools.
pub mod logging;
/// Boosted regression stumps and regression metrics.
pub mod ml;
/// PDF report generation.
pub mod report;
