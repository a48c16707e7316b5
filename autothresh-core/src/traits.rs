//! Core data types and collaborator traits
//!
//! The calibrator talks to the outside world through exactly two seams: a
//! source that yields the current signal reading and a sink that accepts new
//! thresholds. Keep them simple - both are blocking calls bounded by the
//! implementation's own timeout.

use core::fmt;

use crate::time::Timestamp;

/// Single signal reading with the time it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Signal value
    pub value: f64,
    /// When the value was read
    pub timestamp: Timestamp,
}

/// OFF/ON threshold pair derived from the window
///
/// Always `on == off + 1`: the pair carries its own one-unit dead zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThresholdPair {
    off: i64,
    on: i64,
}

impl ThresholdPair {
    /// Build the pair whose OFF threshold is `floor(midpoint)`
    ///
    /// `None` when the midpoint is not finite or `floor(midpoint) + 1` does
    /// not fit in an `i64`.
    pub fn from_midpoint(midpoint: f64) -> Option<Self> {
        // 2^63, exactly representable
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;

        let off = libm::floor(midpoint);
        if !(-LIMIT..LIMIT).contains(&off) {
            return None;
        }
        Self::try_from_off(off as i64)
    }

    /// Build the pair from its OFF threshold, `None` if `off + 1` overflows
    pub fn try_from_off(off: i64) -> Option<Self> {
        off.checked_add(1).map(|on| Self { off, on })
    }

    /// Build the pair from its OFF threshold
    ///
    /// # Panics
    ///
    /// If `off` is `i64::MAX`; use [`try_from_off`](Self::try_from_off) for
    /// untrusted values.
    pub fn from_off(off: i64) -> Self {
        match Self::try_from_off(off) {
            Some(pair) => pair,
            None => panic!("OFF threshold {} leaves no room for ON", off),
        }
    }

    /// Lower threshold; at or below it an ON load switches OFF
    pub fn off(&self) -> i64 {
        self.off
    }

    /// Upper threshold; at or above it the load switches ON
    pub fn on(&self) -> i64 {
        self.on
    }
}

impl fmt::Display for ThresholdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "off={} on={}", self.off, self.on)
    }
}

/// Where readings come from
pub trait SignalSource {
    /// Transport error; always treated as transient
    type Error: fmt::Display;

    /// Fetch the current reading.
    ///
    /// `Ok(None)` means the source answered but had no reading this time.
    fn fetch(&mut self) -> Result<Option<f64>, Self::Error>;
}

/// Where computed thresholds go
pub trait ThresholdSink {
    /// Transport error; always treated as transient
    type Error: fmt::Display;

    /// Push a threshold pair. Best effort, no delivery guarantee.
    fn push(&mut self, thresholds: ThresholdPair) -> Result<(), Self::Error>;
}

impl<S: SignalSource + ?Sized> SignalSource for &mut S {
    type Error = S::Error;

    fn fetch(&mut self) -> Result<Option<f64>, Self::Error> {
        (**self).fetch()
    }
}

impl<S: ThresholdSink + ?Sized> ThresholdSink for &mut S {
    type Error = S::Error;

    fn push(&mut self, thresholds: ThresholdPair) -> Result<(), Self::Error> {
        (**self).push(thresholds)
    }
}
