//! Best-effort authenticated HTTP push.
//!
//! # Responsibilities
//! - POST one JSON envelope with a bearer `Authorization` header
//! - Detach the request so callers never wait on the network
//! - Track in-flight pushes so shutdown can drain them
//!
//! # Design Decisions
//! - No retry, no backoff, no queue: a failed push is logged and dropped
//! - Detached pushes live on a `TaskTracker`; `drain` bounds the wait

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tokio_util::task::TaskTracker;

use crate::config::TransportConfig;
use crate::error::{TelemetryError, TransportError};

/// Where an envelope goes and how it authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub url: String,
    pub authorization: String,
}

impl PushTarget {
    /// Metrics backend: `Bearer <apiKey>`.
    pub fn metrics(url: impl Into<String>, api_key: &str) -> Self {
        Self {
            url: url.into(),
            authorization: format!("Bearer {}", api_key),
        }
    }

    /// Log backend: `Bearer <userId>:<apiKey>`.
    pub fn logs(url: impl Into<String>, user_id: &str, api_key: &str) -> Self {
        Self {
            url: url.into(),
            authorization: format!("Bearer {}:{}", user_id, api_key),
        }
    }
}

/// Local diagnostics only; never exported and never used to retry.
#[derive(Debug, Default)]
pub struct TransportStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl TransportStats {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Fire-and-forget HTTP client for envelopes.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    tracker: TaskTracker,
    stats: Arc<TransportStats>,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(TelemetryError::Client)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            tracker: TaskTracker::new(),
            stats: Arc::new(TransportStats::default()),
        }
    }

    pub fn stats(&self) -> &TransportStats {
        &self.stats
    }

    /// Serialize `envelope` and push it in the background.
    pub fn push<T: Serialize>(&self, target: &PushTarget, envelope: &T) {
        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(e) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::error!(url = %target.url, error = %e, "Failed to serialize envelope, dropping");
                return;
            }
        };

        let this = self.clone();
        let target = target.clone();
        self.spawn(async move {
            if let Err(e) = this.send_bytes(&target, body).await {
                tracing::warn!(url = %target.url, error = %e, "Telemetry push failed, dropping envelope");
            }
        });
    }

    /// Single awaited push attempt.
    pub async fn send<T: Serialize>(
        &self,
        target: &PushTarget,
        envelope: &T,
    ) -> Result<(), TransportError> {
        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(e) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            }
        };
        self.send_bytes(target, body).await
    }

    /// Run `task` on the tracked set so `drain` waits for it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Number of pushes still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the task set and wait up to `timeout` for in-flight pushes.
    /// Returns true if everything finished.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        if !drained {
            tracing::warn!(
                in_flight = self.tracker.len(),
                "Telemetry drain timed out, abandoning in-flight pushes"
            );
        }
        drained
    }

    async fn send_bytes(&self, target: &PushTarget, body: Vec<u8>) -> Result<(), TransportError> {
        let result = self
            .client
            .post(&target.url)
            .header(AUTHORIZATION, &target.authorization)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        self.stats.delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(url = %target.url, "Telemetry pushed");
        Ok(())
    }
}
