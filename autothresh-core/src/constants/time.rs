//! Time-Related Constants
//!
//! Conversion factors and default periods used by the scheduler and the
//! network collaborators. All durations are milliseconds on a monotonic clock.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

// ===== TICK PERIOD =====

/// Default tick period (milliseconds).
///
/// The signal source republishes its smoothed reading roughly once per
/// second; sampling slightly faster than that never misses an update.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 900;

// ===== TIMEOUT VALUES =====

/// Signal fetch timeout (milliseconds).
///
/// Must stay well below the tick period so one hung request cannot eat the
/// next deadline.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 300;

/// Threshold push timeout (milliseconds).
///
/// Also kept below the tick period; a slow sink delays at most one tick.
pub const DEFAULT_PUSH_TIMEOUT_MS: u64 = 800;
