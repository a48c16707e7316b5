//! Time management for the calibration loop
//!
//! Provides clock abstraction so the calibrator never reads the system clock
//! directly:
//! - Monotonic clock (production, immune to wall-clock adjustments)
//! - Mock clock (tests, time only moves when told to)

use alloc::rc::Rc;
use core::cell::Cell;

/// Timestamp in milliseconds on a monotonic clock
pub type Timestamp = u64;

/// Source of time for the calibrator
///
/// Every component that needs "now" takes a `Timestamp` argument; only the
/// scheduler talks to a `TimeSource`.
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// A time source that can also block until a deadline
pub trait Clock: TimeSource {
    /// Block until `deadline`. Returns immediately if it already passed.
    fn sleep_until(&self, deadline: Timestamp);
}

/// Monotonic clock backed by `std::time::Instant`
///
/// Starts at 0 when created, always increases.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Create a clock whose zero is "now"
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn sleep_until(&self, deadline: Timestamp) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(std::time::Duration::from_millis(deadline - now));
        }
    }
}

/// Controllable clock for testing
///
/// Clones share the same underlying time, so a test can keep one handle while
/// the scheduler owns another. Sleeping jumps time forward to the deadline.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<Timestamp>>,
}

impl MockClock {
    /// Create a clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Set absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    /// Move time forward
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

impl Clock for MockClock {
    fn sleep_until(&self, deadline: Timestamp) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

/// Milliseconds elapsed from `earlier` to `later`, zero if the clock ran backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_advances() {
        let clock = MockClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);
    }

    #[test]
    fn clones_share_time() {
        let clock = MockClock::new(0);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now(), 250);
    }

    #[test]
    fn sleep_never_goes_backwards() {
        let clock = MockClock::new(5000);
        clock.sleep_until(4000);
        assert_eq!(clock.now(), 5000);

        clock.sleep_until(6000);
        assert_eq!(clock.now(), 6000);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_ms(1000, 1500), 500);
        assert_eq!(elapsed_ms(1500, 1000), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep_until(start + 5);
        assert!(clock.now() >= start + 5);
    }
}
