//! Time-Bounded Sample Window
//!
//! ## Overview
//!
//! The clusterer needs the recent history of the signal, long enough to see
//! both levels of the load but short enough that thresholds follow slow drift.
//! [`SampleWindow`] keeps the samples of the last `window_ms` milliseconds in
//! arrival order and hands their values to the clusterer on demand.
//!
//! ## Eviction
//!
//! Two rules, both applied from the oldest end on every push:
//!
//! 1. **Age**: samples with `timestamp < now - window_ms` are dropped.
//! 2. **Capacity**: storage is a fixed-size `heapless::Deque`; when it is full
//!    the oldest sample makes room for the new one.
//!
//! ```text
//!   oldest                                    newest
//!   ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!   │ t0 │ t1 │ t2 │ t3 │ t4 │ t5 │ t6 │ t7 │ ← push(t8)
//!   └────┴────┴────┴────┴────┴────┴────┴────┘
//!     ↑ evicted while t < t8 - window_ms
//! ```
//!
//! Configuration validation keeps `window_ms / tick_period_ms` below the
//! capacity, so at one sample per tick the capacity rule never drops a sample
//! that is still young enough. It only bounds memory when samples arrive
//! faster than the tick period.
//!
//! ## Usage Example
//!
//! ```rust
//! use autothresh_core::window::SampleWindow;
//!
//! let mut window: SampleWindow<16> = SampleWindow::new(60_000);
//! window.push(12.0, 1_000);
//! window.push(48.0, 2_000);
//! window.push(47.5, 61_500); // evicts the sample taken at t=1000
//!
//! assert_eq!(window.values().as_slice(), &[48.0, 47.5]);
//! ```

use heapless::{Deque, Vec};

use crate::constants::calibration::WINDOW_CAPACITY;
use crate::time::Timestamp;
use crate::traits::Sample;

/// Window with the default capacity
pub type DefaultWindow = SampleWindow<WINDOW_CAPACITY>;

/// Bounded, time-evicted buffer of recent samples
///
/// ## Internal Invariants
///
/// - Samples are stored in arrival order (oldest at the front)
/// - After every push, each retained sample satisfies
///   `timestamp >= now - window_ms`
/// - `len() <= N`
#[derive(Clone)]
pub struct SampleWindow<const N: usize> {
    samples: Deque<Sample, N>,
    window_ms: u64,
}

impl<const N: usize> SampleWindow<N> {
    /// Create an empty window retaining `window_ms` milliseconds of history
    pub const fn new(window_ms: u64) -> Self {
        Self {
            samples: Deque::new(),
            window_ms,
        }
    }

    /// Append a sample taken at `now`, then evict everything too old
    pub fn push(&mut self, value: f64, now: Timestamp) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Cannot fail: a slot was freed above if the deque was full
        let _ = self.samples.push_back(Sample {
            value,
            timestamp: now,
        });
        self.evict(now);
    }

    /// Drop samples older than `now - window_ms` from the oldest end
    fn evict(&mut self, now: Timestamp) {
        let cutoff = now.saturating_sub(self.window_ms);
        while let Some(oldest) = self.samples.front() {
            if oldest.timestamp >= cutoff {
                break;
            }
            self.samples.pop_front();
        }
    }

    /// Retained values, oldest first
    pub fn values(&self) -> Vec<f64, N> {
        self.samples.iter().map(|sample| sample.value).collect()
    }

    /// Iterate over retained samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured retention in milliseconds
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_window() {
        let window: SampleWindow<8> = SampleWindow::new(1_000);
        assert!(window.is_empty());
        assert!(window.last().is_none());
        assert!(window.values().is_empty());
    }

    #[test]
    fn evicts_by_age() {
        let mut window: SampleWindow<8> = SampleWindow::new(1_000);
        window.push(1.0, 0);
        window.push(2.0, 500);
        window.push(3.0, 1_000);
        assert_eq!(window.len(), 3);

        // cutoff = 1001: only the t=0 sample falls out
        window.push(4.0, 1_001);
        assert_eq!(window.values().as_slice(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn sample_exactly_at_cutoff_is_kept() {
        let mut window: SampleWindow<8> = SampleWindow::new(1_000);
        window.push(1.0, 1_000);
        window.push(2.0, 2_000);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn evicts_by_capacity() {
        let mut window: SampleWindow<3> = SampleWindow::new(u64::MAX);
        for i in 0..5 {
            window.push(i as f64, i);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.values().as_slice(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn early_timestamps_do_not_underflow() {
        let mut window: SampleWindow<8> = SampleWindow::new(180_000);
        window.push(5.0, 10);
        window.push(6.0, 20);
        assert_eq!(window.len(), 2);
        assert_eq!(window.last().map(|s| s.value), Some(6.0));
    }

    proptest! {
        #[test]
        fn retained_samples_are_inside_window(
            steps in proptest::collection::vec((0u64..5_000, -100.0f64..100.0), 1..200),
            window_ms in 1u64..20_000,
        ) {
            let mut window: SampleWindow<64> = SampleWindow::new(window_ms);
            let mut now = 0u64;
            let mut previous_oldest = 0u64;

            for (dt, value) in steps {
                now += dt;
                window.push(value, now);

                let cutoff = now.saturating_sub(window_ms);
                prop_assert!(window.iter().all(|s| s.timestamp >= cutoff));
                prop_assert!(window.len() <= 64);

                // evicted samples never come back
                let oldest = window.iter().next().map(|s| s.timestamp).unwrap_or(now);
                prop_assert!(oldest >= previous_oldest);
                previous_oldest = oldest;
            }
        }
    }
}
