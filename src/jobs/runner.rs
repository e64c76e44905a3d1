use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use super::handle::{JobContext, JobHandle, RunFlag};
use super::{JobError, JobEvent, JobRejected, JobState};

/// Runs one job of a kind at a time on a dedicated thread. No queueing.
///
/// Cancelling or timing out a run only stops delivery; the worker thread is
/// never detached. A worker stuck in a step keeps the runner busy, and new
/// submissions are rejected until that thread exits, so two workers of one
/// kind never overlap.
#[derive(Debug)]
pub struct JobRunner<T> {
    label: &'static str,
    timeout: Option<Duration>,
    current: Option<JobHandle<T>>,
}

impl<T: Send + 'static> JobRunner<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            timeout: None,
            current: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// True while the current run is `Running` or its worker has not exited,
    /// including a worker abandoned by cancellation or timeout.
    pub fn is_busy(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|handle| handle.state() == JobState::Running || !handle.worker_finished())
    }

    pub fn state(&self) -> JobState {
        self.current
            .as_ref()
            .map_or(JobState::Idle, JobHandle::state)
    }

    pub fn handle(&self) -> Option<&JobHandle<T>> {
        self.current.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut JobHandle<T>> {
        self.current.as_mut()
    }

    /// Start `job` on a worker thread, replacing the finished previous run.
    pub fn submit<F>(&mut self, job: F) -> Result<&mut JobHandle<T>, JobRejected>
    where
        F: FnOnce(&JobContext) -> Result<T, JobError> + Send + 'static,
    {
        if self.is_busy() {
            return Err(JobRejected::AlreadyRunning(self.label));
        }
        let flag = RunFlag::default();
        let (progress_tx, progress_rx) = mpsc::channel();
        let (completion_tx, completion_rx) = mpsc::channel();
        let context = JobContext::new(flag.clone(), progress_tx);
        let label = self.label;
        let worker = thread::Builder::new()
            .name(format!("salescast-{label}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| job(&context)))
                    .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(&payload))));
                match &result {
                    Ok(_) => info!("{label} job finished"),
                    Err(JobError::Cancelled) => info!("{label} job stopped after cancellation"),
                    Err(err) => error!("{label} job failed: {err}"),
                }
                let _ = completion_tx.send(result);
            })
            .map_err(|source| JobRejected::Spawn { label, source })?;
        info!("Started {label} job");
        Ok(self.current.insert(JobHandle::new(
            label,
            flag,
            progress_rx,
            completion_rx,
            self.timeout,
            worker,
        )))
    }

    /// Poll the current run, if any.
    pub fn poll(&mut self) -> Vec<JobEvent<T>> {
        self.current
            .as_mut()
            .map(JobHandle::poll)
            .unwrap_or_default()
    }

    /// Cancel the current run; false when nothing is running.
    pub fn cancel(&mut self) -> bool {
        self.current.as_mut().is_some_and(JobHandle::cancel)
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
