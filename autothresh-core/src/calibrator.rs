//! Calibrator state and per-tick processing
//!
//! [`Calibrator`] owns every piece of mutable state of the loop and applies
//! one reading at a time, always in the same order:
//!
//! ```text
//!   reading ─► window.push ─► trend.update ─► gate?
//!                                               ├─ yes ─► clusterer.recompute ─► publish.submit (if changed)
//!                                               └─ no
//!           ─► publish.try_publish ─► classifier.update
//! ```
//!
//! A recompute always finishes before classification, so the classifier
//! never sees a half-updated threshold pair. Nothing here performs I/O except
//! through the [`ThresholdSink`] passed in by the caller.

use log::{debug, info, warn};

use crate::cluster::{ClusterOutcome, ThresholdClusterer};
use crate::config::CalibratorConfig;
use crate::errors::ConfigResult;
use crate::gate::{RecomputeGate, RecomputeReason};
use crate::hysteresis::{HysteresisClassifier, RelayState, Transition};
use crate::publish::{PublishGate, PublishOutcome};
use crate::time::Timestamp;
use crate::traits::{ThresholdPair, ThresholdSink};
use crate::trend::TrendEstimator;
use crate::window::DefaultWindow;

/// What a tick did with its reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// The reading entered the window
    Accepted(f64),
    /// The source answered without a reading
    Missing,
    /// The source failed (timeout, HTTP error, malformed body)
    FetchFailed,
    /// The reading was NaN or infinite and was dropped
    Rejected(f64),
}

/// Everything observable about one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Fate of the reading
    pub reading: Reading,
    /// Why a recompute ran, if it did
    pub recompute: Option<RecomputeReason>,
    /// Clustering result, if a recompute ran
    pub cluster: Option<ClusterOutcome>,
    /// Publish gate result
    pub publish: PublishOutcome,
    /// State change, if any
    pub transition: Option<Transition>,
}

impl TickOutcome {
    /// A tick that left all state untouched
    pub fn skipped(reading: Reading) -> Self {
        Self {
            reading,
            recompute: None,
            cluster: None,
            publish: PublishOutcome::Idle,
            transition: None,
        }
    }
}

/// Read-only view of the calibrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratorSnapshot {
    /// Current thresholds, `None` until the first successful recompute
    pub thresholds: Option<ThresholdPair>,
    /// Current relay decision
    pub state: RelayState,
    /// Trend estimate
    pub trend: Option<f64>,
    /// Samples in the window
    pub window_len: usize,
    /// Thresholds waiting to be pushed
    pub pending_publish: Option<ThresholdPair>,
    /// Time of the last recompute that produced thresholds
    pub last_recompute: Option<Timestamp>,
    /// Time of the last successful push
    pub last_publish: Option<Timestamp>,
}

/// Adaptive threshold calibrator
///
/// Created once at startup and mutated on every tick; lives as long as the
/// process. Multiple instances are fully independent.
#[derive(Clone)]
pub struct Calibrator {
    window: DefaultWindow,
    trend: TrendEstimator,
    gate: RecomputeGate,
    clusterer: ThresholdClusterer,
    publisher: PublishGate,
    classifier: HysteresisClassifier,
}

impl Calibrator {
    /// Build a calibrator from a validated configuration
    pub fn new(config: &CalibratorConfig) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            window: DefaultWindow::new(config.window_ms),
            trend: TrendEstimator::new(config.trend_alpha),
            gate: RecomputeGate::new(
                config.recompute_interval_ms,
                config.jump_abs,
                config.jump_rel,
            ),
            clusterer: ThresholdClusterer::new(config),
            publisher: PublishGate::new(config.publish_min_interval_ms),
            classifier: HysteresisClassifier::new(),
        })
    }

    /// Apply one reading taken at `now`
    pub fn process<S: ThresholdSink>(&mut self, value: f64, now: Timestamp, sink: &mut S) -> TickOutcome {
        if !value.is_finite() {
            warn!("Dropping non-finite reading {}", value);
            return TickOutcome::skipped(Reading::Rejected(value));
        }

        self.window.push(value, now);
        let trend = self.trend.update(value);

        let recompute = self.gate.reason(value, Some(trend), now);
        let cluster = recompute.map(|reason| self.recompute(reason, now));

        let publish = self.publisher.try_publish(sink, now);

        let transition = self.classifier.update(value, self.clusterer.thresholds());
        if let (Some(Transition { from, to }), Some(thresholds)) =
            (transition, self.clusterer.thresholds())
        {
            info!("State {} -> {} at value {:.2} ({})", from, to, value, thresholds);
        }

        debug!(
            "value={:.2} trend={:.2} window={} state={}",
            value,
            trend,
            self.window.len(),
            self.classifier.state(),
        );

        TickOutcome {
            reading: Reading::Accepted(value),
            recompute,
            cluster,
            publish,
            transition,
        }
    }

    fn recompute(&mut self, reason: RecomputeReason, now: Timestamp) -> ClusterOutcome {
        let outcome = self.clusterer.recompute(&self.window.values());

        match outcome {
            ClusterOutcome::Changed(pair) => {
                info!("Thresholds changed to {} ({:?})", pair, reason);
                self.gate.mark_recomputed(now);
                self.publisher.submit(pair);
            }
            ClusterOutcome::Unchanged(_) => {
                debug!("Thresholds unchanged ({:?})", reason);
                self.gate.mark_recomputed(now);
            }
            other => debug!("Recompute skipped: {:?}", other),
        }

        outcome
    }

    /// Current thresholds
    pub fn thresholds(&self) -> Option<ThresholdPair> {
        self.clusterer.thresholds()
    }

    /// Current relay decision
    pub fn state(&self) -> RelayState {
        self.classifier.state()
    }

    /// Read-only view of all state
    pub fn snapshot(&self) -> CalibratorSnapshot {
        CalibratorSnapshot {
            thresholds: self.clusterer.thresholds(),
            state: self.classifier.state(),
            trend: self.trend.estimate(),
            window_len: self.window.len(),
            pending_publish: self.publisher.pending(),
            last_recompute: self.gate.last_recompute(),
            last_publish: self.publisher.last_publish(),
        }
    }
}
