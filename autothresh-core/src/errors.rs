//! Error Types for the Calibration Core
//!
//! ## Design Philosophy
//!
//! The calibrator runs for the life of the process and nothing that happens
//! during a tick is fatal. The error surface of the core is therefore tiny:
//!
//! 1. **Configuration errors** are the only `Err` values the core produces.
//!    They are raised once, at construction, before the loop starts.
//!
//! 2. **Insufficient data** (too few samples, flat signal, clusters too close)
//!    and **no change** (recomputed thresholds equal the stored ones) are
//!    ordinary outcomes, reported through
//!    [`ClusterOutcome`](crate::cluster::ClusterOutcome) rather than `Err`.
//!
//! 3. **Transient I/O failures** belong to the collaborators behind
//!    [`SignalSource`](crate::traits::SignalSource) and
//!    [`ThresholdSink`](crate::traits::ThresholdSink); each brings its own
//!    error type and the scheduler only logs them.
//!
//! Like the rest of the core, errors are `Copy` and carry only
//! `&'static str` context so they can be built without an allocator.

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid calibrator configuration
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A numeric parameter is outside its allowed range
    #[error("Parameter `{name}` out of range: {reason}")]
    OutOfRange {
        /// Configuration field name
        name: &'static str,
        /// Human readable constraint that was violated
        reason: &'static str,
    },

    /// A network timeout does not fit inside one tick period
    #[error("Timeout `{name}` of {timeout_ms} ms must be shorter than the {tick_period_ms} ms tick period")]
    TimeoutExceedsTick {
        /// Configuration field name
        name: &'static str,
        /// Configured timeout
        timeout_ms: u64,
        /// Configured tick period
        tick_period_ms: u64,
    },

    /// A parameter is NaN or infinite
    #[error("Parameter `{name}` is not a finite number")]
    NotFinite {
        /// Configuration field name
        name: &'static str,
    },
}
