//! Where salescast keeps its files.
//!
//! Everything lives under one `.salescast` folder inside the OS config
//! directory. `SALESCAST_CONFIG_HOME` replaces the OS config directory, which
//! keeps portable installs and integration tests away from the real profile.

use std::{
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the config root.
pub const APP_DIR_NAME: &str = ".salescast";
/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "SALESCAST_CONFIG_HOME";

static ROOT_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("Could not determine a config directory for salescast files")]
    NoBaseDir,
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Subfolders of the application root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppDir {
    Root,
    Logs,
    Models,
    Reports,
}

impl AppDir {
    fn relative(self) -> Option<&'static str> {
        match self {
            AppDir::Root => None,
            AppDir::Logs => Some("logs"),
            AppDir::Models => Some("models"),
            AppDir::Reports => Some("reports"),
        }
    }
}

/// The `.salescast` root, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    ensure(AppDir::Root)
}

pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure(AppDir::Logs)
}

/// Default location for saved models when the settings leave it unset.
pub fn models_dir() -> Result<PathBuf, AppDirError> {
    ensure(AppDir::Models)
}

/// Default location for generated PDF reports.
pub fn reports_dir() -> Result<PathBuf, AppDirError> {
    ensure(AppDir::Reports)
}

fn ensure(dir: AppDir) -> Result<PathBuf, AppDirError> {
    let mut path = config_root().ok_or(AppDirError::NoBaseDir)?.join(APP_DIR_NAME);
    if let Some(child) = dir.relative() {
        path.push(child);
    }
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn config_root() -> Option<PathBuf> {
    let overridden = ROOT_OVERRIDE.lock().ok().and_then(|slot| slot.clone());
    overridden
        .or_else(|| std::env::var_os(CONFIG_HOME_ENV).map(PathBuf::from))
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
}

#[cfg(test)]
static OVERRIDE_SERIAL: Mutex<()> = Mutex::new(());

/// Points the config root at `path` for the lifetime of the guard.
#[cfg(test)]
pub(crate) struct RootOverride {
    _serial: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl RootOverride {
    pub(crate) fn new(path: PathBuf) -> Self {
        let serial = OVERRIDE_SERIAL
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Ok(mut slot) = ROOT_OVERRIDE.lock() {
            *slot = Some(path);
        }
        Self { _serial: serial }
    }
}

#[cfg(test)]
impl Drop for RootOverride {
    fn drop(&mut self) {
        if let Ok(mut slot) = ROOT_OVERRIDE.lock() {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn override_moves_root() {
        let base = tempdir().unwrap();
        let _root = RootOverride::new(base.path().to_path_buf());
        let root = app_root_dir().unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert!(root.is_dir());
    }

    #[test]
    fn data_folders_are_created_under_root() {
        let base = tempdir().unwrap();
        let _root = RootOverride::new(base.path().to_path_buf());
        let root = base.path().join(APP_DIR_NAME);
        assert_eq!(models_dir().unwrap(), root.join("models"));
        assert_eq!(reports_dir().unwrap(), root.join("reports"));
        let logs = logs_dir().unwrap();
        assert_eq!(logs, root.join("logs"));
        assert!(logs.is_dir());
    }
}
