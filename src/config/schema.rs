//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the telemetry
//! pipeline. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the telemetry pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Listener for the host service (binary only).
    pub listener: ListenerConfig,

    /// Metrics backend.
    pub metrics: MetricsConfig,

    /// Log backend.
    pub logging: LoggingConfig,

    /// Periodic host resource sampling.
    pub sampler: SamplerConfig,

    /// Request/response instrumentation.
    pub instrumentation: InstrumentationConfig,

    /// Outbound HTTP push settings.
    pub transport: TransportConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Metrics push endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// OTLP/HTTP JSON ingestion URL.
    pub url: String,

    /// Sent as `Authorization: Bearer <api_key>`.
    pub api_key: String,

    /// Identifies this process instance on every data point.
    pub source: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:4318/v1/metrics".to_string(),
            api_key: String::new(),
            source: "pizza-service".to_string(),
        }
    }
}

/// Log push endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log stream push URL.
    pub url: String,

    /// Backend user id, first half of the bearer credential.
    pub user_id: String,

    /// Backend API key, second half of the bearer credential.
    pub api_key: String,

    /// Value of the `component` stream label.
    pub source: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3100/loki/api/v1/push".to_string(),
            user_id: String::new(),
            api_key: String::new(),
            source: "pizza-service".to_string(),
        }
    }
}

/// Periodic sampler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Run the sampler at all.
    pub enabled: bool,

    /// Tick period in milliseconds.
    pub period_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period_ms: 10_000,
        }
    }
}

/// Request instrumentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// HTTP method of the purchase-completing endpoint.
    pub purchase_method: String,

    /// Route template of the purchase-completing endpoint.
    pub purchase_route: String,

    /// Largest request or response body that is buffered for logging.
    pub max_body_bytes: usize,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            purchase_method: "POST".to_string(),
            purchase_route: "/api/order".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Outbound push configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-push request timeout in milliseconds.
    pub timeout_ms: u64,

    /// How long shutdown waits for in-flight pushes.
    pub drain_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            drain_timeout_ms: 3_000,
        }
    }
}
