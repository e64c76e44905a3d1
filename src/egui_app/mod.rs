//! egui dashboard: UI state, controller and renderer.

/// Dashboard controller driving state changes and background jobs.
pub mod controller;
/// Plain state types rendered by the UI.
pub mod state;
/// egui renderer.
pub mod ui;
