//! Hysteresis classifier
//!
//! Turns the raw reading into a stable ON/OFF decision using the current
//! threshold pair:
//!
//! ```text
//!              value >= on
//!   UNKNOWN ─────────────────► ON
//!              value >= on     │  ▲
//!   OFF ───────────────────────┘  │
//!    ▲                            │
//!    └──────── value <= off ──────┘
//! ```
//!
//! A value strictly between `off` and `on` holds the current state. Without
//! thresholds the classifier does nothing.

use core::fmt;

use crate::traits::ThresholdPair;

/// Relay decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelayState {
    /// No thresholds yet, or never crossed the ON threshold
    #[default]
    Unknown,
    /// Load is off
    Off,
    /// Load is on
    On,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "UNKNOWN",
            Self::Off => "OFF",
            Self::On => "ON",
        })
    }
}

/// A state change produced by [`HysteresisClassifier::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the update
    pub from: RelayState,
    /// State after the update
    pub to: RelayState,
}

/// Two-threshold dead-band classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HysteresisClassifier {
    state: RelayState,
}

impl HysteresisClassifier {
    /// Start in [`RelayState::Unknown`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in a known state
    pub fn with_state(state: RelayState) -> Self {
        Self { state }
    }

    /// Current decision
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Classify `value` against `thresholds`, returning the transition if any
    pub fn update(&mut self, value: f64, thresholds: Option<ThresholdPair>) -> Option<Transition> {
        let thresholds = thresholds?;
        let from = self.state;

        let to = match from {
            RelayState::Unknown | RelayState::Off if value >= thresholds.on() as f64 => RelayState::On,
            RelayState::On if value <= thresholds.off() as f64 => RelayState::Off,
            _ => from,
        };

        if to == from {
            return None;
        }
        self.state = to;
        Some(Transition { from, to })
    }
}
