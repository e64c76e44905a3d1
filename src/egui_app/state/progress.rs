use std::time::Instant;

/// Identifies the job driving the progress indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressTaskKind {
    /// Retraining the forecast model.
    Training,
    /// Writing a PDF report.
    Report,
}

/// UI state for job progress shown in the status bar and the training panel.
#[derive(Clone, Debug, Default)]
pub struct ProgressOverlayState {
    pub visible: bool,
    pub task: Option<ProgressTaskKind>,
    pub title: String,
    /// Percent complete, 0..=100.
    pub percent: u8,
    pub cancelable: bool,
    pub cancel_requested: bool,
    pub last_progress_at: Option<Instant>,
}

impl ProgressOverlayState {
    pub fn new(task: ProgressTaskKind, title: impl Into<String>, cancelable: bool) -> Self {
        Self {
            visible: true,
            task: Some(task),
            title: title.into(),
            percent: 0,
            cancelable,
            cancel_requested: false,
            last_progress_at: Some(Instant::now()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_percent(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent != self.percent {
            self.last_progress_at = Some(Instant::now());
        }
        self.percent = percent;
    }

    /// Completion in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f32 {
        f32::from(self.percent.min(100)) / 100.0
    }

    pub fn is_for(&self, task: ProgressTaskKind) -> bool {
        self.visible && self.task == Some(task)
    }
}
