//! Constants for AutoThresh Core
//!
//! Centralised defaults for the calibrator. Every tunable in
//! [`CalibratorConfig`](crate::config::CalibratorConfig) starts from a value
//! defined here, so deployments that only override a few parameters still get
//! a consistent parameter set.
//!
//! ## Organization
//!
//! - **Time**: unit conversions, tick period, network timeouts
//! - **Calibration**: window sizing, clustering limits, jump detection

/// Time-related constants for intervals, timeouts, and tick periods.
pub mod time;

/// Clustering, window and jump-detection parameters.
pub mod calibration;

pub use time::{
    MS_PER_SECOND, DEFAULT_TICK_PERIOD_MS, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_PUSH_TIMEOUT_MS,
};

pub use calibration::{
    DEFAULT_WINDOW_MS, DEFAULT_MIN_SAMPLES, DEFAULT_MIN_CLUSTER_GAP,
    DEFAULT_RECOMPUTE_INTERVAL_MS, DEFAULT_PUBLISH_MIN_INTERVAL_MS,
    DEFAULT_JUMP_ABS, DEFAULT_JUMP_REL, DEFAULT_TREND_ALPHA, WINDOW_CAPACITY,
};
