//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use pizza_telemetry::TelemetryConfig;

/// One push received by the capture backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

impl Captured {
    /// Metric name if this is a metrics envelope.
    pub fn metric_name(&self) -> Option<&str> {
        self.metric()?.get("name")?.as_str()
    }

    pub fn metric(&self) -> Option<&Value> {
        self.body
            .get("resourceMetrics")?
            .get(0)?
            .get("scopeMetrics")?
            .get(0)?
            .get("metrics")?
            .get(0)
    }

    /// First data point of a sum or gauge.
    pub fn data_point(&self) -> Option<&Value> {
        let metric = self.metric()?;
        metric
            .get("sum")
            .or_else(|| metric.get("gauge"))?
            .get("dataPoints")?
            .get(0)
    }

    /// `(labels, payload)` if this is a log envelope.
    pub fn log_entry(&self) -> Option<(&Value, Value)> {
        let stream = self.body.get("streams")?.get(0)?;
        let payload = stream.get("values")?.get(0)?.get(1)?.as_str()?;
        Some((stream.get("stream")?, serde_json::from_str(payload).ok()?))
    }
}

/// Start a backend that records every request and answers with `status`.
pub async fn start_capture_backend(
    status: StatusCode,
) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    start_capture_backend_with_delay(status, Duration::ZERO).await
}

/// Like [`start_capture_backend`] but waits `delay` before answering.
pub async fn start_capture_backend_with_delay(
    status: StatusCode,
    delay: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
        let tx = tx.clone();
        async move {
            let captured = Captured {
                path: uri.path().to_string(),
                authorization: headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
                body: serde_json::from_slice(&body).unwrap_or(Value::Null),
            };
            let _ = tx.send(captured);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            status
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, rx)
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Pipeline config pointing both backends at `addr`.
pub fn config_for(addr: SocketAddr) -> TelemetryConfig {
    let mut config = TelemetryConfig::default();
    config.metrics.url = format!("http://{}/v1/metrics", addr);
    config.metrics.api_key = "metrics-key".into();
    config.metrics.source = "test-svc".into();
    config.logging.url = format!("http://{}/loki/api/v1/push", addr);
    config.logging.user_id = "42".into();
    config.logging.api_key = "logs-key".into();
    config.logging.source = "test-svc".into();
    config.sampler.enabled = false;
    config
}

/// Everything received so far.
pub fn collect(rx: &mut mpsc::UnboundedReceiver<Captured>) -> Vec<Captured> {
    let mut out = Vec::new();
    while let Ok(captured) = rx.try_recv() {
        out.push(captured);
    }
    out
}
