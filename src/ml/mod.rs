//! Machine learning building blocks for sales forecasting.
//!
//! A small deterministic gradient-boosted stump regressor plus the regression
//! metrics used to evaluate it. Models serialize to JSON via serde.

pub mod gbdt_stump;
pub mod metrics;
