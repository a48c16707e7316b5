//! Calibrator configuration
//!
//! Every tunable of the calibration loop lives in [`CalibratorConfig`]. The
//! defaults are the field-tested parameter set from [`crate::constants`];
//! deployments override individual values with the `with_*` builders or,
//! with the `serde` feature, from a partial settings document.
//!
//! ```rust
//! use autothresh_core::config::CalibratorConfig;
//!
//! let config = CalibratorConfig::default()
//!     .with_window_ms(60_000)
//!     .with_jump_abs(5.0);
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::calibration::{
    DEFAULT_CONVERGENCE_EPSILON, DEFAULT_JUMP_ABS, DEFAULT_JUMP_REL, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MIN_CLUSTER_GAP, DEFAULT_MIN_SAMPLES, DEFAULT_PUBLISH_MIN_INTERVAL_MS,
    DEFAULT_RECOMPUTE_INTERVAL_MS, DEFAULT_SPREAD_EPSILON, DEFAULT_TREND_ALPHA,
    DEFAULT_WINDOW_MS, WINDOW_CAPACITY,
};
use crate::constants::time::{
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_PUSH_TIMEOUT_MS, DEFAULT_TICK_PERIOD_MS,
};
use crate::errors::{ConfigError, ConfigResult};

/// Calibration loop parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CalibratorConfig {
    /// How long a sample stays in the window
    pub window_ms: u64,
    /// Minimum window size before clustering runs
    pub min_samples: usize,
    /// Minimum centroid separation for a usable threshold pair
    pub min_cluster_gap: f64,
    /// Minimum `max - min` spread of the window
    pub spread_epsilon: f64,
    /// Two-means iteration cap
    pub max_iterations: usize,
    /// Centroid movement that counts as converged
    pub convergence_epsilon: f64,
    /// Periodic recompute floor
    pub recompute_interval_ms: u64,
    /// Minimum spacing between threshold pushes
    pub publish_min_interval_ms: u64,
    /// Absolute trend deviation that forces a recompute
    pub jump_abs: f64,
    /// Relative trend deviation that forces a recompute
    pub jump_rel: f64,
    /// Trend EMA smoothing factor, in (0, 1)
    pub trend_alpha: f64,
    /// Scheduler tick period
    pub tick_period_ms: u64,
    /// Signal fetch timeout, shorter than the tick period
    pub fetch_timeout_ms: u64,
    /// Threshold push timeout, shorter than the tick period
    pub push_timeout_ms: u64,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            min_samples: DEFAULT_MIN_SAMPLES,
            min_cluster_gap: DEFAULT_MIN_CLUSTER_GAP,
            spread_epsilon: DEFAULT_SPREAD_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_epsilon: DEFAULT_CONVERGENCE_EPSILON,
            recompute_interval_ms: DEFAULT_RECOMPUTE_INTERVAL_MS,
            publish_min_interval_ms: DEFAULT_PUBLISH_MIN_INTERVAL_MS,
            jump_abs: DEFAULT_JUMP_ABS,
            jump_rel: DEFAULT_JUMP_REL,
            trend_alpha: DEFAULT_TREND_ALPHA,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            push_timeout_ms: DEFAULT_PUSH_TIMEOUT_MS,
        }
    }
}

impl CalibratorConfig {
    /// Set the sample window duration
    pub fn with_window_ms(mut self, ms: u64) -> Self {
        self.window_ms = ms;
        self
    }

    /// Set the minimum sample count for clustering
    pub fn with_min_samples(mut self, count: usize) -> Self {
        self.min_samples = count;
        self
    }

    /// Set the minimum centroid separation
    pub fn with_min_cluster_gap(mut self, gap: f64) -> Self {
        self.min_cluster_gap = gap;
        self
    }

    /// Set the periodic recompute interval
    pub fn with_recompute_interval_ms(mut self, ms: u64) -> Self {
        self.recompute_interval_ms = ms;
        self
    }

    /// Set the minimum spacing between pushes
    pub fn with_publish_min_interval_ms(mut self, ms: u64) -> Self {
        self.publish_min_interval_ms = ms;
        self
    }

    /// Set the absolute jump threshold
    pub fn with_jump_abs(mut self, jump: f64) -> Self {
        self.jump_abs = jump;
        self
    }

    /// Set the relative jump threshold
    pub fn with_jump_rel(mut self, jump: f64) -> Self {
        self.jump_rel = jump;
        self
    }

    /// Set the trend smoothing factor
    pub fn with_trend_alpha(mut self, alpha: f64) -> Self {
        self.trend_alpha = alpha;
        self
    }

    /// Set the tick period
    pub fn with_tick_period_ms(mut self, ms: u64) -> Self {
        self.tick_period_ms = ms;
        self
    }

    /// Set both network timeouts
    pub fn with_timeouts_ms(mut self, fetch_ms: u64, push_ms: u64) -> Self {
        self.fetch_timeout_ms = fetch_ms;
        self.push_timeout_ms = push_ms;
        self
    }

    /// Check every parameter against its allowed range
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("min_cluster_gap", self.min_cluster_gap),
            ("spread_epsilon", self.spread_epsilon),
            ("convergence_epsilon", self.convergence_epsilon),
            ("jump_abs", self.jump_abs),
            ("jump_rel", self.jump_rel),
            ("trend_alpha", self.trend_alpha),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name });
            }
            if value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    reason: "must not be negative",
                });
            }
        }

        if self.trend_alpha <= 0.0 || self.trend_alpha >= 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "trend_alpha",
                reason: "must be strictly between 0 and 1",
            });
        }

        if self.min_samples < 2 {
            return Err(ConfigError::OutOfRange {
                name: "min_samples",
                reason: "two clusters need at least 2 samples",
            });
        }

        if self.max_iterations == 0 {
            return Err(ConfigError::OutOfRange {
                name: "max_iterations",
                reason: "must be at least 1",
            });
        }

        for (name, value) in [
            ("window_ms", self.window_ms),
            ("tick_period_ms", self.tick_period_ms),
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("push_timeout_ms", self.push_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::OutOfRange {
                    name,
                    reason: "must be greater than zero",
                });
            }
        }

        // a window spanning k periods holds up to k + 1 samples
        if self.window_ms / self.tick_period_ms >= WINDOW_CAPACITY as u64 {
            return Err(ConfigError::OutOfRange {
                name: "window_ms",
                reason: "holds more samples than the window capacity at this tick period",
            });
        }

        for (name, timeout_ms) in [
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("push_timeout_ms", self.push_timeout_ms),
        ] {
            if timeout_ms >= self.tick_period_ms {
                return Err(ConfigError::TimeoutExceedsTick {
                    name,
                    timeout_ms,
                    tick_period_ms: self.tick_period_ms,
                });
            }
        }

        Ok(())
    }
}
