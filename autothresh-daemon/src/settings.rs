//! Daemon settings
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. a JSON file (path from the first CLI argument or `AUTOTHRESH_CONFIG`)
//! 3. environment overrides (`AUTOTHRESH_SIGNAL_URL`, `AUTOTHRESH_SINK_URL`,
//!    `AUTOTHRESH_TICK_MS`)
//!
//! The file may be partial; every missing key keeps its default:
//!
//! ```json
//! {
//!   "signal_url": "http://meter.local:8080/config",
//!   "calibrator": { "window_ms": 120000, "jump_abs": 5.0 }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use autothresh_connectors::http::DEFAULT_SIGNAL_FIELD;
use autothresh_core::{CalibratorConfig, ConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file path variable
pub const ENV_CONFIG: &str = "AUTOTHRESH_CONFIG";
/// Signal URL override
pub const ENV_SIGNAL_URL: &str = "AUTOTHRESH_SIGNAL_URL";
/// Sink URL override
pub const ENV_SINK_URL: &str = "AUTOTHRESH_SINK_URL";
/// Tick period override in milliseconds
pub const ENV_TICK_MS: &str = "AUTOTHRESH_TICK_MS";

/// Endpoint serving the reading and accepting thresholds on the metering device
pub const DEFAULT_ENDPOINT: &str = "http://192.168.30.150:8080/config";

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings file is not valid JSON for [`Settings`]
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment override could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },

    /// Calibrator parameters out of range
    #[error("Invalid calibrator settings: {0}")]
    Calibrator(#[from] ConfigError),

    /// Other invalid setting
    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: &'static str },
}

/// Complete daemon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// GET endpoint returning the current reading
    pub signal_url: String,
    /// POST endpoint accepting `{"th_on", "th_off"}`
    pub sink_url: String,
    /// JSON field holding the reading
    pub signal_field: String,
    /// Calibration parameters
    pub calibrator: CalibratorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            signal_url: DEFAULT_ENDPOINT.to_string(),
            sink_url: DEFAULT_ENDPOINT.to_string(),
            signal_field: DEFAULT_SIGNAL_FIELD.to_string(),
            calibrator: CalibratorConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Apply environment overrides looked up through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SIGNAL_URL) {
            self.signal_url = url;
        }
        if let Some(url) = lookup(ENV_SINK_URL) {
            self.sink_url = url;
        }
        if let Some(value) = lookup(ENV_TICK_MS) {
            let ms = value.trim().parse::<u64>().map_err(|_| SettingsError::Env {
                name: ENV_TICK_MS,
                value: value.clone(),
            })?;
            self.calibrator.tick_period_ms = ms;
        }
        Ok(self)
    }

    /// Check everything that can be checked without touching the network
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.signal_field.is_empty() {
            return Err(SettingsError::Invalid {
                name: "signal_field",
                reason: "must not be empty",
            });
        }
        self.calibrator.validate()?;
        Ok(())
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// [`load`](Self::load) with overrides looked up through `lookup`
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let settings = settings.apply_env(lookup)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Settings path from the first CLI argument, else from `AUTOTHRESH_CONFIG`
pub fn config_path<I>(mut args: I, env_value: Option<String>) -> Option<PathBuf>
where
    I: Iterator<Item = String>,
{
    args.next().or(env_value).map(PathBuf::from)
}
