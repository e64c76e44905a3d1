//! Deterministic gradient-boosted decision-stump regressor.
//!
//! A lightweight squared-error booster that avoids external ML dependencies:
//! - Histogram (binned) split search per feature.
//! - Optional row subsampling driven by a fixed-seed RNG, so fits are reproducible.
//! - Per-stump split gain, used for feature weights.

mod model;
mod train;

pub use model::{GbdtStumpRegressor, MODEL_VERSION, Stump};
pub use train::{MAX_ROUNDS, TrainDataset, TrainOptions, train_gbdt_stump};
