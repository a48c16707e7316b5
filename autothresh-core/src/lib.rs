//! Adaptive threshold calibration for two-level loads
//!
//! Turns a noisy streaming reading (typically the smoothed power draw of an
//! appliance) into a stable ON/OFF relay decision with self-tuning
//! thresholds:
//!
//! - a time-bounded window of recent samples
//! - two-means clustering of the window into an OFF level and an ON level
//! - a trend estimate that forces a recompute on step changes
//! - debounced publishing of new thresholds
//! - a hysteresis classifier with a dead band between the thresholds
//!
//! Key constraints:
//! - No heap allocation per tick (fixed-capacity window)
//! - Single-threaded, all state owned by one loop
//! - Nothing after construction is fatal
//!
//! ```no_run
//! use autothresh_core::{Calibrator, CalibratorConfig, Poller, StopToken};
//! use autothresh_core::time::MonotonicClock;
//! # use autothresh_core::traits::{SignalSource, ThresholdSink, ThresholdPair};
//! # struct Source;
//! # impl SignalSource for Source {
//! #     type Error = &'static str;
//! #     fn fetch(&mut self) -> Result<Option<f64>, Self::Error> { Ok(Some(1.0)) }
//! # }
//! # struct Sink;
//! # impl ThresholdSink for Sink {
//! #     type Error = &'static str;
//! #     fn push(&mut self, _: ThresholdPair) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let config = CalibratorConfig::default();
//! let calibrator = Calibrator::new(&config)?;
//! let mut poller = Poller::new(calibrator, Source, Sink, MonotonicClock::new(), config.tick_period_ms);
//!
//! let stop = StopToken::new();
//! poller.run(&stop);
//! # Ok::<(), autothresh_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod calibrator;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gate;
pub mod hysteresis;
pub mod publish;
pub mod scheduler;
pub mod time;
pub mod traits;
pub mod trend;
pub mod window;

// Public API
pub use calibrator::{Calibrator, CalibratorSnapshot, Reading, TickOutcome};
pub use cluster::{ClusterOutcome, ThresholdClusterer};
pub use config::CalibratorConfig;
pub use errors::{ConfigError, ConfigResult};
pub use gate::{RecomputeGate, RecomputeReason};
pub use hysteresis::{HysteresisClassifier, RelayState, Transition};
pub use publish::{PublishGate, PublishOutcome};
pub use scheduler::{Poller, StopToken};
pub use traits::{Sample, SignalSource, ThresholdPair, ThresholdSink};
pub use trend::TrendEstimator;
pub use window::SampleWindow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
