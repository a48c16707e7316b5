//! Shared fixtures for calibration loop integration tests
//!
//! - Scripted signal sources that advance a shared mock clock
//! - Recording sinks with injectable failures
//! - Square-wave generators for bistable loads

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use autothresh_core::{
    time::MockClock,
    traits::{SignalSource, ThresholdPair, ThresholdSink},
    Calibrator, CalibratorConfig, Poller,
};

/// Default tick period used by the fixtures (milliseconds)
pub const TICK_MS: u64 = 900;

/// Source that replays readings, then reports "no reading"
pub struct ScriptedSource {
    readings: VecDeque<Result<Option<f64>, &'static str>>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self {
            readings: values.into_iter().map(|v| Ok(Some(v))).collect(),
        }
    }

    pub fn from_results(readings: Vec<Result<Option<f64>, &'static str>>) -> Self {
        Self {
            readings: readings.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl SignalSource for ScriptedSource {
    type Error = &'static str;

    fn fetch(&mut self) -> Result<Option<f64>, Self::Error> {
        self.readings.pop_front().unwrap_or(Ok(None))
    }
}

/// What the sink saw, shared with the test body
#[derive(Debug, Default)]
pub struct SinkLog {
    pub attempts: usize,
    pub pushed: Vec<ThresholdPair>,
    pub fail_next: usize,
}

/// Sink that records pushes and fails the next `fail_next` attempts
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub log: Rc<RefCell<SinkLog>>,
}

impl RecordingSink {
    pub fn attempts(&self) -> usize {
        self.log.borrow().attempts
    }

    pub fn pushed(&self) -> Vec<ThresholdPair> {
        self.log.borrow().pushed.clone()
    }

    pub fn fail_next(&self, count: usize) {
        self.log.borrow_mut().fail_next = count;
    }
}

impl ThresholdSink for RecordingSink {
    type Error = &'static str;

    fn push(&mut self, thresholds: ThresholdPair) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        log.attempts += 1;
        if log.fail_next > 0 {
            log.fail_next -= 1;
            return Err("connection refused");
        }
        log.pushed.push(thresholds);
        Ok(())
    }
}

/// Repeated blocks of `low` and `high`, `block` samples each, `cycles` times
pub fn square_wave(low: f64, high: f64, block: usize, cycles: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(2 * block * cycles);
    for _ in 0..cycles {
        values.extend(std::iter::repeat(low).take(block));
        values.extend(std::iter::repeat(high).take(block));
    }
    values
}

pub type TestPoller = Poller<ScriptedSource, RecordingSink, MockClock>;

/// Poller on a mock clock starting at t=0 with a shared recording sink
pub fn poller(config: &CalibratorConfig, source: ScriptedSource) -> (TestPoller, RecordingSink) {
    let sink = RecordingSink::default();
    let calibrator = Calibrator::new(config).expect("valid config");
    let poller = Poller::new(
        calibrator,
        source,
        sink.clone(),
        MockClock::new(0),
        config.tick_period_ms,
    );
    (poller, sink)
}
