//! AutoThresh service wiring
//!
//! Glue between [`Settings`], the HTTP connectors and the core poller. The
//! binary in `main.rs` only adds the logger, the signal handler and the exit
//! code.

pub mod settings;

use autothresh_connectors::http::{HttpConfig, HttpError, HttpSignalSource, HttpThresholdSink};
use autothresh_core::time::MonotonicClock;
use autothresh_core::{Calibrator, ConfigError, Poller};
use log::LevelFilter;
use thiserror::Error;

pub use settings::{Settings, SettingsError};

/// Debug switch variable
pub const ENV_DEBUG: &str = "AUTOTHRESH_DEBUG";

/// Production poller type
pub type HttpPoller = Poller<HttpSignalSource, HttpThresholdSink, MonotonicClock>;

/// Startup errors; the only errors that stop the daemon
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Calibrator: {0}")]
    Calibrator(#[from] ConfigError),

    #[error("Connector: {0}")]
    Connector(#[from] HttpError),

    #[error("Signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

/// Default log level for the value of `AUTOTHRESH_DEBUG`
pub fn default_log_level(debug: Option<&str>) -> LevelFilter {
    match debug.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => LevelFilter::Debug,
        _ => LevelFilter::Info,
    }
}

/// Build the HTTP source and sink and wire them to a fresh calibrator
pub fn build_poller(settings: &Settings) -> Result<HttpPoller, DaemonError> {
    let config = &settings.calibrator;
    let calibrator = Calibrator::new(config)?;

    let source = HttpSignalSource::new(
        HttpConfig::new(settings.signal_url.as_str()).timeout_ms(config.fetch_timeout_ms),
        settings.signal_field.as_str(),
    )?;
    let sink = HttpThresholdSink::new(
        HttpConfig::new(settings.sink_url.as_str()).timeout_ms(config.push_timeout_ms),
    )?;

    Ok(Poller::new(
        calibrator,
        source,
        sink,
        MonotonicClock::new(),
        config.tick_period_ms,
    ))
}
