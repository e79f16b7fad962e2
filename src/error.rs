//! Error types for the telemetry pipeline.
//!
//! None of these ever reach the instrumented HTTP response. They are logged
//! locally at the boundary where they occur and the affected data point is
//! dropped.

use thiserror::Error;

use crate::telemetry::MetricKind;

/// A metric mutation that was rejected before touching the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("counter {name} cannot be decremented (delta {delta})")]
    NegativeDelta { name: String, delta: i64 },

    #[error("metric {name} is a {existing} and cannot be used as a {requested}")]
    KindMismatch {
        name: String,
        existing: MetricKind,
        requested: MetricKind,
    },

    #[error("gauge {name} received non-finite value")]
    NonFinite { name: String },
}

/// Failure while pushing an envelope to the remote backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request to backend failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend rejected push with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Failure inside a single sampling tick.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("host resource sampling is not supported on this platform")]
    Unsupported,

    #[error("probe failed: {0}")]
    Probe(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Umbrella error for pipeline construction.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
