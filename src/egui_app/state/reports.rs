use std::path::PathBuf;

use time::Date;

/// Lifecycle of a generated report as shown in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStatus {
    InProgress,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Completed => "Completed",
            ReportStatus::Failed => "Failed",
        }
    }
}

/// One row in the generated reports list. Kept in memory only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub name: String,
    pub path: PathBuf,
    pub created_on: Date,
    pub status: ReportStatus,
    pub error: Option<String>,
}

/// UI state for the Reports tab.
#[derive(Clone, Debug, Default)]
pub struct ReportsState {
    pub entries: Vec<ReportEntry>,
    pub generation_in_progress: bool,
}

impl ReportsState {
    pub fn push(&mut self, entry: ReportEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Resolve the in-progress entry for `name`.
    pub fn finish(&mut self, name: &str, status: ReportStatus, error: Option<String>) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.name == name && entry.status == ReportStatus::InProgress)
        {
            entry.status = status;
            entry.error = error;
        }
    }
}
