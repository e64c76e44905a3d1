//! Persisted dashboard settings stored as TOML in the app root.
//!
//! Config keys (TOML): `data_path`, `models_dir`, `reports_dir`, `[training]`
//! (`n_estimators`, `learning_rate`, `bins`, `subsample`) and `[jobs]`
//! (`timeout_secs`). Missing keys fall back to defaults; out-of-range values are
//! clamped when loaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::forecast::Hyperparameters;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Historical data location used when none is configured.
pub const DEFAULT_DATA_PATH: &str = "data/historical_sales.csv";

/// Errors raised while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config directory unavailable: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Top-level settings persisted in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// CSV with `Date, Sales, MarketingSpend[, IsHoliday]` columns.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Directory holding `sales_model_*.model` files; `None` uses the app root.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
    /// Directory receiving generated PDF reports; `None` uses the app root.
    #[serde(default)]
    pub reports_dir: Option<PathBuf>,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub jobs: JobSettings,
}

/// Default hyperparameters offered by the retraining panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: u32,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_bins")]
    pub bins: u32,
    #[serde(default = "default_subsample")]
    pub subsample: f64,
}

/// Background job limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Seconds before a running job is abandoned as failed; 0 disables the limit.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_n_estimators() -> u32 {
    100
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_bins() -> u32 {
    32
}

fn default_subsample() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    600
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            models_dir: None,
            reports_dir: None,
            training: TrainingSettings::default(),
            jobs: JobSettings::default(),
        }
    }
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            learning_rate: default_learning_rate(),
            bins: default_bins(),
            subsample: default_subsample(),
        }
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppSettings {
    /// Clamp values into the ranges the UI and trainer accept.
    pub fn normalized(mut self) -> Self {
        self.training.n_estimators = self.training.n_estimators.clamp(1, 1000);
        if !self.training.learning_rate.is_finite() || self.training.learning_rate <= 0.0 {
            self.training.learning_rate = default_learning_rate();
        }
        self.training.learning_rate = self.training.learning_rate.min(1.0);
        self.training.bins = self.training.bins.clamp(2, 256);
        if !self.training.subsample.is_finite() || self.training.subsample <= 0.0 {
            self.training.subsample = default_subsample();
        }
        self.training.subsample = self.training.subsample.min(1.0);
        self
    }

    /// Resolve the model directory, falling back to `<root>/models`.
    pub fn resolved_models_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.models_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(app_dirs::models_dir()?),
        }
    }

    /// Resolve the report directory, falling back to `<root>/reports`.
    pub fn resolved_reports_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.reports_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(app_dirs::reports_dir()?),
        }
    }

    /// Hyperparameter mapping seeded from the configured training defaults.
    pub fn default_hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::default()
            .with("n_estimators", self.training.n_estimators as f64)
            .with("learning_rate", self.training.learning_rate)
            .with("bins", self.training.bins as f64)
            .with("subsample", self.training.subsample)
    }

    /// Configured job timeout, `None` when disabled.
    pub fn job_timeout(&self) -> Option<Duration> {
        (self.jobs.timeout_secs > 0).then(|| Duration::from_secs(self.jobs.timeout_secs))
    }
}

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from disk, returning defaults if missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Load settings from a specific file; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppSettings>(&text)
        .map(AppSettings::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Persist settings to the default config path.
pub fn save(settings: &AppSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &config_path()?)
}

/// Save settings to a specific path, creating parent directories as needed.
pub fn save_to_path(settings: &AppSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
