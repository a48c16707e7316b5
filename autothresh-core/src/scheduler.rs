//! Fixed-period poller
//!
//! Drives the calibrator: one tick per period, strictly sequential, no
//! background work. The only blocking points are the clock sleep and the two
//! collaborator calls, each bounded by the collaborator's own timeout.
//!
//! ## Scheduling
//!
//! Deadlines are absolute on a monotonic clock. The next deadline is advanced
//! by exactly one period *before* the tick's I/O, so a slow fetch does not
//! shift later ticks:
//!
//! ```text
//!  deadline:  0        900       1800      2700
//!             │ fetch  │ fetch   │ fetch   │
//!             ├──────┐ ├───┐     ├────────┐│
//! ```
//!
//! If a tick overruns by a full period or more, the missed deadlines are
//! skipped and the schedule re-anchors at the current time instead of
//! replaying a burst of ticks.
//!
//! ## Stopping
//!
//! [`StopToken`] is checked between ticks (before and after the sleep). Clone
//! it into whatever should be able to stop the loop: a signal handler, a
//! supervisor, a test.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::calibrator::{Calibrator, Reading, TickOutcome};
use crate::time::{Clock, Timestamp};
use crate::traits::{SignalSource, ThresholdSink};

/// Cooperative stop signal shared between the loop and its owner
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    /// Create a token that has not been stopped
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current tick
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The shared flag itself, for handlers that set it directly
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }
}

/// Single-threaded fetch → calibrate → publish → classify loop
pub struct Poller<Src, Snk, C> {
    calibrator: Calibrator,
    source: Src,
    sink: Snk,
    clock: C,
    period_ms: u64,
    next_deadline: Option<Timestamp>,
    ticks: u64,
}

impl<Src, Snk, C> Poller<Src, Snk, C>
where
    Src: SignalSource,
    Snk: ThresholdSink,
    C: Clock,
{
    /// Wire a calibrator to its collaborators
    pub fn new(calibrator: Calibrator, source: Src, sink: Snk, clock: C, period_ms: u64) -> Self {
        Self {
            calibrator,
            source,
            sink,
            clock,
            period_ms,
            next_deadline: None,
            ticks: 0,
        }
    }

    /// Run until `stop` is signalled; returns the number of ticks executed
    pub fn run(&mut self, stop: &StopToken) -> u64 {
        info!("Poller started, period {} ms", self.period_ms);
        let start = self.ticks;

        while !stop.is_stopped() {
            self.wait_for_deadline();
            if stop.is_stopped() {
                break;
            }
            self.tick();
        }

        let executed = self.ticks - start;
        info!("Poller stopped after {} ticks", executed);
        executed
    }

    /// Sleep until the next deadline, then run one tick
    pub fn step(&mut self) -> TickOutcome {
        self.wait_for_deadline();
        self.tick()
    }

    /// Block until the next deadline and advance it by one period
    fn wait_for_deadline(&mut self) {
        let now = self.clock.now();
        let mut deadline = self.next_deadline.unwrap_or(now);

        if now >= deadline.saturating_add(self.period_ms) {
            let missed = (now - deadline) / self.period_ms.max(1);
            debug!("Tick overran, skipping {} missed deadline(s)", missed);
            deadline = now;
        }

        self.clock.sleep_until(deadline);
        self.next_deadline = Some(deadline + self.period_ms);
    }

    /// Run one tick immediately
    pub fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;

        let value = match self.source.fetch() {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("No reading this tick");
                return TickOutcome::skipped(Reading::Missing);
            }
            Err(e) => {
                warn!("Signal fetch failed: {}", e);
                return TickOutcome::skipped(Reading::FetchFailed);
            }
        };

        let now = self.clock.now();
        self.calibrator.process(value, now, &mut self.sink)
    }

    /// The calibrator being driven
    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Deadline of the next tick, once the loop has started
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.next_deadline
    }

    /// The clock driving the loop
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The signal source
    pub fn source(&self) -> &Src {
        &self.source
    }

    /// The threshold sink
    pub fn sink(&self) -> &Snk {
        &self.sink
    }
}
