//! Debounced threshold publishing
//!
//! Decouples "thresholds changed" from "network call happens". Changes are
//! queued as a single pending pair (the latest one wins); a push is attempted
//! only once `min_interval_ms` has passed since the last *successful* push.
//!
//! ```text
//!  change ──► pending = pair
//!  tick ────► pending && now - last_success >= min_interval ?
//!                 ├─ no  ──► Deferred (pair stays pending)
//!                 └─ yes ──► sink.push(pair)
//!                              ├─ Ok  ──► last_success = now, pending = None
//!                              └─ Err ──► Failed (nothing advances, retried next tick)
//! ```
//!
//! There is no queue and no backoff: each tick makes at most one attempt and
//! failures never reach the caller as errors.

use log::{info, warn};

use crate::time::{elapsed_ms, Timestamp};
use crate::traits::{ThresholdPair, ThresholdSink};

/// What the gate did on a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PublishOutcome {
    /// Nothing pending
    Idle,
    /// A pair is pending but the minimum interval has not elapsed
    Deferred {
        /// Milliseconds until the next attempt is allowed
        remaining_ms: u64,
    },
    /// The sink accepted the pair
    Published(ThresholdPair),
    /// The sink failed; the pair stays pending
    Failed(ThresholdPair),
}

impl PublishOutcome {
    /// Whether a push was attempted this tick
    pub fn attempted(&self) -> bool {
        matches!(self, Self::Published(_) | Self::Failed(_))
    }
}

/// Rate limiter for outbound threshold pushes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishGate {
    min_interval_ms: u64,
    pending: Option<ThresholdPair>,
    last_publish: Option<Timestamp>,
}

impl PublishGate {
    /// Create a gate with nothing pending that may push immediately
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            pending: None,
            last_publish: None,
        }
    }

    /// Queue `thresholds` for the next eligible push, replacing any pending pair
    pub fn submit(&mut self, thresholds: ThresholdPair) {
        self.pending = Some(thresholds);
    }

    /// Pair waiting to be pushed
    pub fn pending(&self) -> Option<ThresholdPair> {
        self.pending
    }

    /// Time of the last successful push
    pub fn last_publish(&self) -> Option<Timestamp> {
        self.last_publish
    }

    /// Milliseconds until a push is allowed at `now` (zero when allowed)
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        match self.last_publish {
            None => 0,
            Some(last) => self.min_interval_ms.saturating_sub(elapsed_ms(last, now)),
        }
    }

    /// Push the pending pair to `sink` if the minimum interval allows it
    pub fn try_publish<S: ThresholdSink>(&mut self, sink: &mut S, now: Timestamp) -> PublishOutcome {
        let Some(thresholds) = self.pending else {
            return PublishOutcome::Idle;
        };

        let remaining_ms = self.remaining_ms(now);
        if remaining_ms > 0 {
            return PublishOutcome::Deferred { remaining_ms };
        }

        match sink.push(thresholds) {
            Ok(()) => {
                info!("Published thresholds {}", thresholds);
                self.last_publish = Some(now);
                self.pending = None;
                PublishOutcome::Published(thresholds)
            }
            Err(e) => {
                warn!("Threshold push failed ({}): {}", thresholds, e);
                PublishOutcome::Failed(thresholds)
            }
        }
    }
}
