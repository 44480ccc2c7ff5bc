use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::projection::{ProjectionOptions, DEFAULT_NAME_DELIMITER, DEFAULT_PROGRESS_EVERY};

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const APP_DIR: &str = "forecast_core";
/// Overrides the directory the configuration lives in.
pub const HOME_ENV: &str = "FORECAST_CORE_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// User preferences that shape projections and their presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "Config::default_progress_every")]
    pub progress_every: usize,
    #[serde(default = "Config::default_name_delimiter")]
    pub name_delimiter: String,
    /// Window length used when a caller gives a start date but no end date.
    #[serde(default = "Config::default_window_days")]
    pub default_window_days: u32,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            progress_every: Self::default_progress_every(),
            name_delimiter: Self::default_name_delimiter(),
            default_window_days: Self::default_window_days(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_progress_every() -> usize {
        DEFAULT_PROGRESS_EVERY
    }

    pub fn default_name_delimiter() -> String {
        DEFAULT_NAME_DELIMITER.into()
    }

    pub fn default_window_days() -> u32 {
        365
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            progress_every: self.progress_every.max(1),
            name_delimiter: self.name_delimiter.clone(),
        }
    }
}

/// Loads and saves [`Config`] as JSON under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    /// Uses `FORECAST_CORE_HOME` when set, else the platform config directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_base_dir(resolve_base_dir())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns defaults when no file exists yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.config_path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn resolve_base_dir() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
