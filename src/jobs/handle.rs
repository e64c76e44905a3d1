use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
    mpsc::{Receiver, Sender, TryRecvError},
};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::{JobError, JobEvent, JobState};

type ProgressHandler = Box<dyn FnMut(u8)>;
type CompletionHandler<T> = Box<dyn FnMut(&Result<T, JobError>)>;

/// Shared run flag. Moves out of `ACTIVE` at most once: to `CANCELLED` from
/// the control thread or to `COMMITTED` from the worker.
#[derive(Debug, Clone, Default)]
pub(super) struct RunFlag(Arc<AtomicU8>);

impl RunFlag {
    const ACTIVE: u8 = 0;
    const CANCELLED: u8 = 1;
    const COMMITTED: u8 = 2;

    pub(super) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire) == Self::CANCELLED
    }

    /// False once the worker has committed.
    pub(super) fn cancel(&self) -> bool {
        match self.0.compare_exchange(
            Self::ACTIVE,
            Self::CANCELLED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == Self::CANCELLED,
        }
    }

    /// False once the run was cancelled or timed out.
    pub(super) fn commit(&self) -> bool {
        match self.0.compare_exchange(
            Self::ACTIVE,
            Self::COMMITTED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => true,
            Err(current) => current == Self::COMMITTED,
        }
    }
}

/// Worker-side view of a running job.
#[derive(Debug, Clone)]
pub struct JobContext {
    flag: RunFlag,
    progress: Sender<u8>,
}

impl JobContext {
    pub(super) fn new(flag: RunFlag, progress: Sender<u8>) -> Self {
        Self { flag, progress }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    /// Claim the run before an irreversible side effect such as persisting a
    /// file. After a successful commit the control thread no longer times the
    /// run out, so the outcome the worker reports is the one delivered.
    ///
    /// Fails with [`JobError::Cancelled`] when the run was already cancelled
    /// or timed out; the side effect must then be skipped.
    pub fn commit(&self) -> Result<(), JobError> {
        if self.flag.commit() {
            Ok(())
        } else {
            Err(JobError::Cancelled)
        }
    }

    /// Report a milestone, or stop with [`JobError::Cancelled`] if cancellation
    /// was requested.
    pub fn checkpoint(&self, percent: u8) -> Result<(), JobError> {
        if self.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        // The handle may already be gone; nobody is listening then.
        let _ = self.progress.send(percent.min(100));
        Ok(())
    }
}

/// Control-thread view of one job run.
pub struct JobHandle<T> {
    label: &'static str,
    state: JobState,
    progress: u8,
    flag: RunFlag,
    progress_rx: Receiver<u8>,
    completion_rx: Receiver<Result<T, JobError>>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    worker: Option<JoinHandle<()>>,
    on_progress: Option<ProgressHandler>,
    on_completion: Option<CompletionHandler<T>>,
}

impl<T> std::fmt::Debug for JobHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl<T> JobHandle<T> {
    pub(super) fn new(
        label: &'static str,
        flag: RunFlag,
        progress_rx: Receiver<u8>,
        completion_rx: Receiver<Result<T, JobError>>,
        timeout: Option<Duration>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            label,
            state: JobState::Running,
            progress: 0,
            flag,
            progress_rx,
            completion_rx,
            timeout,
            deadline: timeout.map(|t| Instant::now() + t),
            worker: Some(worker),
            on_progress: None,
            on_completion: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Highest progress delivered so far.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Whether the worker thread has exited.
    pub fn worker_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    pub fn on_progress(&mut self, handler: impl FnMut(u8) + 'static) -> &mut Self {
        self.on_progress = Some(Box::new(handler));
        self
    }

    pub fn on_completion(
        &mut self,
        handler: impl FnMut(&Result<T, JobError>) + 'static,
    ) -> &mut Self {
        self.on_completion = Some(Box::new(handler));
        self
    }

    /// Request cancellation. The handle is `Cancelled` from here on and
    /// delivers nothing more; a step already running still finishes.
    pub fn cancel(&mut self) -> bool {
        if self.state != JobState::Running {
            return false;
        }
        self.flag.cancel();
        self.state = JobState::Cancelled;
        info!("Cancelled {} job at {}%", self.label, self.progress);
        true
    }

    /// Drain pending notifications, invoking registered handlers.
    pub fn poll(&mut self) -> Vec<JobEvent<T>> {
        if self.state != JobState::Running {
            return Vec::new();
        }
        // Progress is always sent before completion, so reading completion
        // first guarantees every earlier milestone is already queued.
        let completion = match self.completion_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(JobError::Panicked(
                "worker exited without reporting".to_string(),
            ))),
        };
        let mut events = Vec::new();
        while let Ok(percent) = self.progress_rx.try_recv() {
            if percent > self.progress {
                self.progress = percent;
                events.push(JobEvent::Progress(percent));
            }
        }
        match completion {
            Some(Err(JobError::Cancelled)) => {
                self.state = JobState::Cancelled;
            }
            Some(result) => {
                self.state = if result.is_ok() {
                    JobState::Completed
                } else {
                    JobState::Failed
                };
                events.push(JobEvent::Completed(result));
            }
            None => {
                // A committed worker is finishing its side effect; wait for it.
                if let (Some(deadline), Some(timeout)) = (self.deadline, self.timeout)
                    && Instant::now() >= deadline
                    && self.flag.cancel()
                {
                    self.state = JobState::Failed;
                    warn!("{} job timed out after {:?}", self.label, timeout);
                    events.push(JobEvent::Completed(Err(JobError::TimedOut(timeout))));
                }
            }
        }
        self.dispatch(&events);
        events
    }

    fn dispatch(&mut self, events: &[JobEvent<T>]) {
        for event in events {
            match event {
                JobEvent::Progress(percent) => {
                    if let Some(handler) = self.on_progress.as_mut() {
                        handler(*percent);
                    }
                }
                JobEvent::Completed(result) => {
                    if let Some(handler) = self.on_completion.as_mut() {
                        handler(result);
                    }
                }
            }
        }
    }
}
