//! Network collaborators for the AutoThresh calibration loop
//!
//! ## Overview
//!
//! The core crate only knows two seams: a [`SignalSource`] that yields the
//! current reading and a [`ThresholdSink`] that accepts a new threshold pair.
//! This crate implements both over plain HTTP/JSON:
//!
//! | Direction | Method | Body                                  |
//! |-----------|--------|---------------------------------------|
//! | inbound   | GET    | `{"ema_R": 42.7, ...}` (field configurable) |
//! | outbound  | POST   | `{"th_on": 31, "th_off": 30}`         |
//!
//! Every request is bounded by the timeout of its [`HttpConfig`]; there are
//! no retries here. A failed tick is simply retried by the next tick.
//!
//! ## Example Usage
//!
//! ```no_run
//! use autothresh_connectors::http::{HttpConfig, HttpSignalSource, HttpThresholdSink};
//! use autothresh_core::traits::{SignalSource, ThresholdPair, ThresholdSink};
//!
//! let mut source = HttpSignalSource::new(
//!     HttpConfig::new("http://meter.local:8080/config").timeout_ms(300),
//!     "ema_R",
//! )?;
//! let mut sink = HttpThresholdSink::new(
//!     HttpConfig::new("http://meter.local:8080/config").timeout_ms(800),
//! )?;
//!
//! if let Some(value) = source.fetch()? {
//!     println!("reading {}", value);
//! }
//! sink.push(ThresholdPair::from_off(30))?;
//! # Ok::<(), autothresh_connectors::http::HttpError>(())
//! ```
//!
//! [`SignalSource`]: autothresh_core::traits::SignalSource
//! [`ThresholdSink`]: autothresh_core::traits::ThresholdSink

pub mod http;

// Re-export common types
pub use http::{HttpConfig, HttpError, HttpSignalSource, HttpThresholdSink, ThresholdPayload};

/// Request counters kept by every connector
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Requests that completed with an accepted response
    pub requests_ok: u64,
    /// Requests that failed (transport, status, or payload)
    pub requests_failed: u64,
    /// Total request body bytes sent
    pub bytes_sent: u64,
    /// Total response body bytes received
    pub bytes_received: u64,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_ok(&mut self, sent: usize, received: usize) {
        self.requests_ok += 1;
        self.bytes_sent += sent as u64;
        self.bytes_received += received as u64;
    }

    pub(crate) fn record_failure(&mut self, error: &HttpError) {
        self.requests_failed += 1;
        self.last_error = Some(error.to_string());
    }

    /// Share of failed requests, zero before the first request
    pub fn failure_ratio(&self) -> f64 {
        let total = self.requests_ok + self.requests_failed;
        if total == 0 {
            0.0
        } else {
            self.requests_failed as f64 / total as f64
        }
    }
}
