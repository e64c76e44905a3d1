//! Off-thread job execution with progress, cancellation and timeouts.
//!
//! Each [`JobRunner`] owns at most one worker thread. Workers report progress
//! through a [`JobContext`]; the control thread drains notifications with
//! [`JobHandle::poll`].

mod forecast;
mod handle;
mod report;
mod runner;
mod training;

pub use forecast::{FORECAST_MILESTONES, ForecastView, run_forecast};
pub use handle::{JobContext, JobHandle};
pub use report::{REPORT_MILESTONES, run_report};
pub use runner::JobRunner;
pub use training::{TRAINING_MILESTONES, run_training};

use std::time::Duration;

use thiserror::Error;

use crate::dataset::DataError;
use crate::forecast::TrainingError;
use crate::report::ReportError;

/// Lifecycle of one job run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

/// Why a job run did not produce its payload.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Training(#[from] TrainingError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Job timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("Job worker panicked: {0}")]
    Panicked(String),
    /// Raised inside the worker when cancellation is observed; never delivered.
    #[error("Job cancelled")]
    Cancelled,
}

/// Notification delivered on the control thread.
#[derive(Debug)]
pub enum JobEvent<T> {
    /// Percent complete. Within one run `poll` only delivers values above the
    /// highest already delivered; repeats and lower values are dropped.
    Progress(u8),
    /// Exactly one per run unless the run was cancelled.
    Completed(Result<T, JobError>),
}

/// Reasons a submission was refused.
#[derive(Debug, Error)]
pub enum JobRejected {
    #[error("A {0} job is already running")]
    AlreadyRunning(&'static str),
    #[error("Failed to start {label} worker: {source}")]
    Spawn {
        label: &'static str,
        source: std::io::Error,
    },
}
