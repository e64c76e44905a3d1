use std::path::PathBuf;

use super::{JobContext, JobError};
use crate::forecast::{Predictor, ReportJob};
use crate::report::{compose, stage_report};

/// Progress values reported by [`run_report`], in order.
pub const REPORT_MILESTONES: [u8; 3] = [10, 60, 100];

/// Build the requested report; yields the written path.
///
/// The file only appears at `output_path` if the run is still live when it
/// commits. A run cancelled or timed out before then leaves nothing behind.
pub fn run_report(
    ctx: &JobContext,
    job: &ReportJob,
    predictor: &Predictor,
) -> Result<PathBuf, JobError> {
    ctx.checkpoint(10)?;
    let payload = predictor.predict_latest();
    let document = compose(&job.report_name, &payload)?;
    ctx.checkpoint(60)?;
    let staged = stage_report(&job.output_path, &document)?;
    ctx.commit()?;
    staged.persist()?;
    ctx.checkpoint(100)?;
    Ok(job.output_path.clone())
}
