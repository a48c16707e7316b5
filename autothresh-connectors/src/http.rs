//! HTTP signal source and threshold sink
//!
//! ## Overview
//!
//! Both collaborators of the calibration loop live behind small JSON
//! endpoints on the metering device. [`HttpSignalSource`] polls the current
//! smoothed reading, [`HttpThresholdSink`] posts a new threshold pair.
//!
//! ## Implementation Choices
//!
//! - Blocking `ureq` client, one agent per collaborator, so the two timeouts
//!   are independent
//! - Every request carries the agent-wide timeout; nothing waits unbounded
//! - No retries: the loop retries on its next tick
//! - Errors are typed ([`HttpError`]) but never fatal to the caller
//!
//! ## Payloads
//!
//! The signal body is a JSON object. The configured field (default `ema_R`)
//! may be a number or a numeric string. A missing or `null` field means "no
//! reading this tick" and is not an error:
//!
//! ```text
//!   {"ema_R": 42.7}        -> Ok(Some(42.7))
//!   {"ema_R": "42.7"}      -> Ok(Some(42.7))
//!   {"ema_R": null}        -> Ok(None)
//!   {"other": 1}           -> Ok(None)
//!   {"ema_R": [1]}         -> Err(Payload)
//!   not json               -> Err(Payload)
//! ```
//!
//! The sink body is `{"th_on": <int>, "th_off": <int>}`.

use std::time::Duration;

use autothresh_core::traits::{SignalSource, ThresholdPair, ThresholdSink};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ConnectionStats;

/// Default signal field name
pub const DEFAULT_SIGNAL_FIELD: &str = "ema_R";

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Invalid connector configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or timeout
    #[error("Transport failed: {0}")]
    Transport(String),

    /// Server answered with an unexpected status
    #[error("Server returned status {status}")]
    Status { status: u16 },

    /// Response body could not be interpreted
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ureq::Error> for HttpError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, _) => HttpError::Status { status },
            ureq::Error::Transport(transport) => HttpError::Transport(transport.to_string()),
        }
    }
}

/// HTTP configuration for one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Full endpoint URL
    pub url: String,
    /// Timeout applied to the whole request
    pub timeout: Duration,
    /// Custom headers
    pub headers: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create a configuration for `url` with a 1 s timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(1),
            headers: Vec::new(),
            user_agent: format!("autothresh/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Check the URL scheme and timeout
    pub fn validate(&self) -> Result<(), HttpError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(HttpError::Config(format!(
                "URL must start with http:// or https://: {}",
                self.url
            )));
        }
        if self.timeout.is_zero() {
            return Err(HttpError::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }

    fn agent(&self) -> Result<ureq::Agent, HttpError> {
        self.validate()?;
        Ok(ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build())
    }

    fn apply_headers(&self, mut request: ureq::Request) -> ureq::Request {
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }
        request
    }
}

/// Body posted to the threshold sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPayload {
    /// ON threshold
    pub th_on: i64,
    /// OFF threshold
    pub th_off: i64,
}

impl From<ThresholdPair> for ThresholdPayload {
    fn from(pair: ThresholdPair) -> Self {
        Self {
            th_on: pair.on(),
            th_off: pair.off(),
        }
    }
}

/// Extract `field` from a JSON object body
pub fn parse_reading(body: &str, field: &str) -> Result<Option<f64>, HttpError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| HttpError::Payload(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| HttpError::Payload("body is not a JSON object".into()))?;

    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| HttpError::Payload(format!("field `{}` is out of range", field))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| HttpError::Payload(format!("field `{}` is not numeric: {:?}", field, s))),
        Some(other) => Err(HttpError::Payload(format!(
            "field `{}` is not numeric: {}",
            field, other
        ))),
    }
}

/// Signal source polling a JSON endpoint with GET
pub struct HttpSignalSource {
    config: HttpConfig,
    agent: ureq::Agent,
    field: String,
    stats: ConnectionStats,
}

impl HttpSignalSource {
    /// Create a source reading `field` from `config.url`
    pub fn new(config: HttpConfig, field: impl Into<String>) -> Result<Self, HttpError> {
        let field = field.into();
        if field.is_empty() {
            return Err(HttpError::Config("signal field must not be empty".into()));
        }
        let agent = config.agent()?;

        Ok(Self {
            config,
            agent,
            field,
            stats: ConnectionStats::default(),
        })
    }

    /// Endpoint configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Field read from the body
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Request counters
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    fn request(&self) -> Result<String, HttpError> {
        let request = self
            .config
            .apply_headers(self.agent.get(&self.config.url))
            .set("Accept", "application/json");
        let response = request.call()?;

        let status = response.status();
        if status != 200 {
            return Err(HttpError::Status { status });
        }
        response
            .into_string()
            .map_err(|e| HttpError::Transport(e.to_string()))
    }
}

impl SignalSource for HttpSignalSource {
    type Error = HttpError;

    fn fetch(&mut self) -> Result<Option<f64>, Self::Error> {
        let result = self
            .request()
            .and_then(|body| parse_reading(&body, &self.field).map(|value| (body.len(), value)));

        match result {
            Ok((received, value)) => {
                self.stats.record_ok(0, received);
                if value.is_none() {
                    debug!("Field `{}` absent from {}", self.field, self.config.url);
                }
                Ok(value)
            }
            Err(e) => {
                self.stats.record_failure(&e);
                Err(e)
            }
        }
    }
}

/// Threshold sink posting JSON to an endpoint
pub struct HttpThresholdSink {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: ConnectionStats,
}

impl HttpThresholdSink {
    /// Create a sink posting to `config.url`
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let agent = config.agent()?;
        Ok(Self {
            config,
            agent,
            stats: ConnectionStats::default(),
        })
    }

    /// Endpoint configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Request counters
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    fn send(&self, json: &str) -> Result<(), HttpError> {
        let request = self
            .config
            .apply_headers(self.agent.post(&self.config.url))
            .set("Content-Type", "application/json");
        let response = request.send_string(json)?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(HttpError::Status { status });
        }
        Ok(())
    }
}

impl ThresholdSink for HttpThresholdSink {
    type Error = HttpError;

    fn push(&mut self, thresholds: ThresholdPair) -> Result<(), Self::Error> {
        let json = serde_json::to_string(&ThresholdPayload::from(thresholds))
            .map_err(|e| HttpError::Serialization(e.to_string()))?;

        match self.send(&json) {
            Ok(()) => {
                self.stats.record_ok(json.len(), 0);
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(&e);
                Err(e)
            }
        }
    }
}
