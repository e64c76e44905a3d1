use std::path::Path;

use tracing::info;

use super::{JobContext, JobError};
use crate::dataset::{Column, load_features};
use crate::forecast::{Trainer, TrainingJob, TrainingResult};

/// Progress values reported by [`run_training`], in order.
pub const TRAINING_MILESTONES: [u8; 5] = [5, 30, 45, 90, 100];

/// Load history from `data_path` and train the requested model.
pub fn run_training(
    ctx: &JobContext,
    job: &TrainingJob,
    data_path: &Path,
    trainer: &Trainer,
) -> Result<TrainingResult, JobError> {
    ctx.checkpoint(5)?;
    let rows = load_features(data_path)?;
    ctx.checkpoint(30)?;
    let features = job.features();
    info!(
        "Training {} with {} features on {} rows",
        job.algorithm.label(),
        features.len(),
        rows.len()
    );
    ctx.checkpoint(45)?;
    let result = trainer.train(&rows, Column::Sales, &features, &job.hyperparameters)?;
    ctx.checkpoint(90)?;
    ctx.checkpoint(100)?;
    Ok(result)
}
