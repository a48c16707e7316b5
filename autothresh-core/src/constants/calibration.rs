//! Calibration Constants
//!
//! Defaults for the sample window, the two-means clusterer, the recompute
//! gate and the publish debounce. Values come from field deployments against
//! a bistable appliance load (heater element, compressor) read through a
//! smoothed power signal.

use super::time::MS_PER_SECOND;

// ===== SAMPLE WINDOW =====

/// Sample window duration (milliseconds).
///
/// Three minutes holds both levels of a load that cycles every few minutes.
pub const DEFAULT_WINDOW_MS: u64 = 180 * MS_PER_SECOND;

/// Compile-time capacity of the sample window.
///
/// 180 s at a 0.9 s tick is 200 samples; the rest is headroom for faster
/// tick periods. When full, the oldest sample is dropped first.
pub const WINDOW_CAPACITY: usize = 512;

// ===== CLUSTERING =====

/// Minimum number of samples before clustering runs.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// Minimum distance between the two cluster centroids (signal units).
///
/// Below this the signal is not bimodal enough to separate OFF from ON.
pub const DEFAULT_MIN_CLUSTER_GAP: f64 = 1.0;

/// Minimum `max - min` spread of the window before clustering runs.
pub const DEFAULT_SPREAD_EPSILON: f64 = 1e-6;

/// Iteration cap for the two-means refinement.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Centroid movement below which the refinement has converged.
pub const DEFAULT_CONVERGENCE_EPSILON: f64 = 1e-6;

// ===== RECOMPUTE GATE =====

/// Periodic recompute floor (milliseconds).
pub const DEFAULT_RECOMPUTE_INTERVAL_MS: u64 = 180 * MS_PER_SECOND;

/// Absolute deviation from the trend that forces a recompute (signal units).
pub const DEFAULT_JUMP_ABS: f64 = 8.0;

/// Relative deviation from the trend that forces a recompute (0.35 = 35 %).
pub const DEFAULT_JUMP_REL: f64 = 0.35;

/// Guard for the relative jump denominator.
pub const TREND_EPSILON: f64 = 1e-6;

/// EMA smoothing factor for the trend estimator.
pub const DEFAULT_TREND_ALPHA: f64 = 0.2;

// ===== PUBLISHING =====

/// Minimum spacing between threshold pushes (milliseconds).
pub const DEFAULT_PUBLISH_MIN_INTERVAL_MS: u64 = 15 * MS_PER_SECOND;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_capacity_covers_default_window() {
        let samples = DEFAULT_WINDOW_MS / super::super::time::DEFAULT_TICK_PERIOD_MS;
        assert!((samples as usize) < WINDOW_CAPACITY);
    }

    #[test]
    fn alpha_in_open_unit_interval() {
        assert!(DEFAULT_TREND_ALPHA > 0.0 && DEFAULT_TREND_ALPHA < 1.0);
    }
}
