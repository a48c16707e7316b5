//! Recompute gate
//!
//! Decides on each tick whether the thresholds should be re-derived. Two
//! triggers, either one suffices:
//!
//! 1. **Periodic floor**: at least `recompute_interval_ms` since the last
//!    successful recompute (or no recompute yet).
//! 2. **Jump**: the reading deviates from the trend estimate by at least
//!    `jump_abs` units, or, for a positive trend, by at least `jump_rel` of it.
//!
//! ```text
//!  value ─┐
//!         ├─ |value - trend| >= jump_abs ─────────────┐
//!  trend ─┘  |value - trend| / trend >= jump_rel ─────┼─► recompute
//!  now - last_recompute >= interval ──────────────────┘
//! ```

use crate::constants::calibration::TREND_EPSILON;
use crate::time::{elapsed_ms, Timestamp};

/// Why a recompute was requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecomputeReason {
    /// No successful recompute yet
    Initial,
    /// The periodic interval elapsed
    Interval {
        /// Milliseconds since the last successful recompute
        elapsed_ms: u64,
    },
    /// The reading jumped away from the trend
    Jump {
        /// `|value - trend|`
        deviation: f64,
    },
}

/// Periodic + jump-triggered recompute decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeGate {
    interval_ms: u64,
    jump_abs: f64,
    jump_rel: f64,
    last_recompute: Option<Timestamp>,
}

impl RecomputeGate {
    /// Create a gate that has never seen a recompute
    pub fn new(interval_ms: u64, jump_abs: f64, jump_rel: f64) -> Self {
        Self {
            interval_ms,
            jump_abs,
            jump_rel,
            last_recompute: None,
        }
    }

    /// Should the thresholds be recomputed for `value` at `now`?
    pub fn should_recompute(&self, value: f64, trend: Option<f64>, now: Timestamp) -> bool {
        self.reason(value, trend, now).is_some()
    }

    /// Like [`should_recompute`](Self::should_recompute), naming the trigger
    pub fn reason(&self, value: f64, trend: Option<f64>, now: Timestamp) -> Option<RecomputeReason> {
        let Some(last) = self.last_recompute else {
            return Some(RecomputeReason::Initial);
        };

        let elapsed = elapsed_ms(last, now);
        if elapsed >= self.interval_ms {
            return Some(RecomputeReason::Interval { elapsed_ms: elapsed });
        }

        let trend = trend?;
        let deviation = libm::fabs(value - trend);
        if deviation >= self.jump_abs {
            return Some(RecomputeReason::Jump { deviation });
        }
        if trend > 0.0 && deviation / trend.max(TREND_EPSILON) >= self.jump_rel {
            return Some(RecomputeReason::Jump { deviation });
        }

        None
    }

    /// Record a successful recompute at `now`
    pub fn mark_recomputed(&mut self, now: Timestamp) {
        self.last_recompute = Some(now);
    }

    /// Time of the last successful recompute
    pub fn last_recompute(&self) -> Option<Timestamp> {
        self.last_recompute
    }
}
