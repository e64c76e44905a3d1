mod support;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use support::history::write_history_csv;

use salescast::forecast::{
    Algorithm, Hyperparameters, ModelStore, Trainer, TrainingJob, TrainingResult,
};
use salescast::jobs::{
    JobContext, JobError, JobEvent, JobRunner, JobState, TRAINING_MILESTONES, run_training,
};

fn drain<T: Send + 'static>(runner: &mut JobRunner<T>) -> Vec<JobEvent<T>> {
    let started = Instant::now();
    let mut events = Vec::new();
    while started.elapsed() < Duration::from_secs(20) {
        events.extend(runner.poll());
        if runner.state().is_terminal() && !runner.is_busy() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    events
}

fn default_job() -> TrainingJob {
    TrainingJob {
        selected_features: BTreeSet::new(),
        algorithm: Algorithm::GradientBoosting,
        hyperparameters: Hyperparameters::default().with("n_estimators", 80.0),
    }
}

fn progress_values<T>(events: &[JobEvent<T>]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Progress(p) => Some(*p),
            JobEvent::Completed(_) => None,
        })
        .collect()
}

#[test]
fn training_job_reports_every_milestone() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = temp.path().join("history.csv");
    write_history_csv(&csv, 30);
    let trainer = Trainer::new(ModelStore::new(temp.path().join("models")));
    let job = default_job();

    let mut runner: JobRunner<TrainingResult> = JobRunner::new("training");
    runner
        .submit(move |ctx| run_training(ctx, &job, &csv, &trainer))
        .expect("submit");
    let events = drain(&mut runner);

    assert_eq!(runner.state(), JobState::Completed);
    let progress = progress_values(&events);
    assert!(progress.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(progress.last().copied(), Some(100));
    assert!(progress.iter().all(|p| TRAINING_MILESTONES.contains(p)));
    let completed: Vec<&TrainingResult> = events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Completed(Ok(result)) => Some(result),
            _ => None,
        })
        .collect();
    assert_eq!(completed.len(), 1);
    assert!(completed[0].model_path.is_file());
}

#[test]
fn training_job_fails_on_missing_history() {
    let temp = tempfile::tempdir().expect("tempdir");
    let trainer = Trainer::new(ModelStore::new(temp.path().join("models")));
    let missing = temp.path().join("missing.csv");
    let job = default_job();

    let mut runner: JobRunner<TrainingResult> = JobRunner::new("training");
    runner
        .submit(move |ctx| run_training(ctx, &job, &missing, &trainer))
        .expect("submit");
    let events = drain(&mut runner);

    assert_eq!(runner.state(), JobState::Failed);
    assert!(
        events
            .iter()
            .any(|event| matches!(event, JobEvent::Completed(Err(JobError::Data(_)))))
    );
    let store = ModelStore::new(temp.path().join("models"));
    assert!(store.list_ids().expect("list").is_empty());
}

/// Worker that walks the training milestones, announcing each one and
/// waiting for the test before moving on.
fn stepped_job(
    reached: mpsc::Sender<u8>,
    step: mpsc::Receiver<()>,
    side_effect: PathBuf,
) -> impl FnOnce(&JobContext) -> Result<u8, JobError> + Send + 'static {
    move |ctx: &JobContext| {
        for milestone in TRAINING_MILESTONES {
            ctx.checkpoint(milestone)?;
            let _ = reached.send(milestone);
            let _ = step.recv();
        }
        ctx.checkpoint(100)?;
        std::fs::write(&side_effect, b"done")
            .map_err(|err| JobError::Panicked(err.to_string()))?;
        Ok(100)
    }
}

#[test]
fn cancel_after_each_milestone_stops_progress() {
    for milestone in TRAINING_MILESTONES {
        let temp = tempfile::tempdir().expect("tempdir");
        let marker = temp.path().join("marker");
        let (reached_tx, reached_rx) = mpsc::channel();
        let (step_tx, step_rx) = mpsc::channel();
        let mut runner: JobRunner<u8> = JobRunner::new("stepped");
        runner
            .submit(stepped_job(reached_tx, step_rx, marker.clone()))
            .expect("submit");

        loop {
            let reached = reached_rx
                .recv_timeout(Duration::from_secs(10))
                .expect("worker reached a milestone");
            if reached == milestone {
                break;
            }
            step_tx.send(()).expect("step");
        }
        let seen = progress_values(&runner.poll());
        assert_eq!(seen.last().copied(), Some(milestone));
        assert!(runner.cancel());
        drop(step_tx);

        let after = drain(&mut runner);
        assert_eq!(runner.state(), JobState::Cancelled);
        assert!(after.is_empty(), "events after cancel at {milestone}");
        assert!(!runner.is_busy());
        assert!(!marker.exists());
    }
}
