//! `autothresh` binary
//!
//! ```text
//! autothresh [settings.json]
//! ```
//!
//! Runs the calibration loop until SIGINT/SIGTERM. Exits non-zero only when
//! startup fails.

use std::env;
use std::process::ExitCode;

use autothresh_core::StopToken;
use autothresh_daemon::settings::{config_path, ENV_CONFIG};
use autothresh_daemon::{build_poller, default_log_level, DaemonError, Settings, ENV_DEBUG};
use log::{error, info};
use signal_hook::consts::signal::{SIGINT, SIGTERM};

fn init_logger() {
    let debug = env::var(ENV_DEBUG).ok();
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(default_log_level(debug.as_deref()))
        .format_timestamp_millis();
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn run() -> Result<(), DaemonError> {
    let path = config_path(env::args().skip(1), env::var(ENV_CONFIG).ok());
    let settings = Settings::load(path.as_deref())?;
    info!(
        "Polling {} field `{}` every {} ms, publishing to {}",
        settings.signal_url,
        settings.signal_field,
        settings.calibrator.tick_period_ms,
        settings.sink_url
    );

    let mut poller = build_poller(&settings)?;

    let stop = StopToken::new();
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, stop.flag())?;
    }

    poller.run(&stop);

    let snapshot = poller.calibrator().snapshot();
    info!(
        "Final state {} thresholds {:?}; signal {:?}; sink {:?}",
        snapshot.state,
        snapshot.thresholds,
        poller.source().stats(),
        poller.sink().stats()
    );
    Ok(())
}

fn main() -> ExitCode {
    init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
