//! Tracing setup for the dashboard and the command-line tools.
//!
//! The dashboard writes to stdout and to one file per launch under the app
//! `logs` folder; only the newest launch files are kept. The command-line
//! tools log to stderr so their stdout can be piped.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

const RETAINED_LAUNCH_LOGS: usize = 10;
const LAUNCH_LOG_PREFIX: &str = "salescast";
const DEFAULT_DIRECTIVE: &str = "info";

type LogTimer = fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>>;

static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static SUBSCRIBER_SET: OnceLock<()> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    LogDir(#[from] app_dirs::AppDirError),
    #[error("Could not list log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not delete stale log {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not open log file {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not timestamp log file name: {0}")]
    FormatTime(#[from] time::error::Format),
    /// Another subscriber was already installed for this process.
    #[error("Tracing subscriber already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install dashboard logging. Calling it again is a no-op.
///
/// Errors are returned rather than panicking; the dashboard keeps running
/// without a log file when this fails.
pub fn init() -> Result<(), LoggingError> {
    if SUBSCRIBER_SET.get().is_some() {
        return Ok(());
    }
    let dir = app_dirs::logs_dir()?;
    let file_name = launch_log_name(local_now())?;
    let path = dir.join(&file_name);
    touch(&path)?;
    trim_launch_logs(&dir, RETAINED_LAUNCH_LOGS)?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, file_name));
    let timer = local_timer();
    let console = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let file = fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer);
    tracing::subscriber::set_global_default(
        Registry::default().with(env_filter()).with(console).with(file),
    )?;
    let _ = FILE_WRITER_GUARD.set(guard);
    let _ = SUBSCRIBER_SET.set(());

    tracing::info!(log_file = %path.display(), "Logging ready");
    Ok(())
}

/// Install stderr-only logging for the command-line tools.
pub fn init_cli() -> Result<(), LoggingError> {
    if SUBSCRIBER_SET.get().is_some() {
        return Ok(());
    }
    let stderr = fmt::layer()
        .with_timer(local_timer())
        .with_writer(std::io::stderr);
    tracing::subscriber::set_global_default(Registry::default().with(env_filter()).with(stderr))?;
    let _ = SUBSCRIBER_SET.set(());
    Ok(())
}

fn touch(path: &Path) -> Result<(), LoggingError> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(_) => Ok(()),
        Err(source) => Err(LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn launch_logs(dir: &Path) -> Result<Vec<(SystemTime, PathBuf)>, LoggingError> {
    let entries = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "log") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        logs.push((modified, path));
    }
    Ok(logs)
}

/// Remove all but the `keep` most recently modified `.log` files.
fn trim_launch_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let mut logs = launch_logs(dir)?;
    if logs.len() <= keep {
        return Ok(());
    }
    logs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in logs.split_off(keep) {
        if let Err(source) = fs::remove_file(&path) {
            return Err(LoggingError::RemoveFile { path, source });
        }
    }
    Ok(())
}

fn launch_log_name(started: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LAUNCH_LOG_PREFIX}_{}.log", started.format(STAMP)?))
}

fn local_timer() -> LogTimer {
    const LINE_STAMP: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    #[test]
    fn launch_log_name_is_stamped() {
        let started = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            launch_log_name(started).unwrap(),
            "salescast_2023-11-14_22-13-20.log"
        );
    }

    #[test]
    fn trim_drops_oldest_launch_logs_only() {
        let dir = tempdir().unwrap();
        for idx in 0..12 {
            touch(&dir.path().join(format!("salescast_{idx:02}.log"))).unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        trim_launch_logs(dir.path(), 10).unwrap();

        let remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining.len(), 11);
        assert!(remaining.iter().any(|name| name == "notes.txt"));
        assert!(!remaining.iter().any(|name| name == "salescast_00.log"));
        assert!(!remaining.iter().any(|name| name == "salescast_01.log"));
        assert!(remaining.iter().any(|name| name == "salescast_11.log"));
    }

    #[test]
    fn trim_is_a_noop_under_the_limit() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("salescast_a.log")).unwrap();
        trim_launch_logs(dir.path(), 10).unwrap();
        assert!(dir.path().join("salescast_a.log").is_file());
    }
}
