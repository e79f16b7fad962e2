//! Owned wiring of the telemetry pipeline.
//!
//! `Pipeline` owns the registry, the active-session set and the exporter and
//! hands shared references to the middleware and the sampler. There is no
//! global state; every component receives what it needs explicitly.

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};

use crate::config::TelemetryConfig;
use crate::error::TelemetryError;
use crate::export::{Exporter, Transport};
use crate::http::middleware::{instrument, InstrumentationState};
use crate::sampler::{HostProbe, PeriodicSampler, ResourceProbe, SamplerHandle};
use crate::telemetry::{ActiveUsers, MetricRegistry};

pub struct Pipeline {
    config: TelemetryConfig,
    registry: Arc<MetricRegistry>,
    active_users: Arc<ActiveUsers>,
    exporter: Exporter,
}

impl Pipeline {
    pub fn new(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let transport = Transport::new(&config.transport)?;
        let exporter = Exporter::new(transport, &config.metrics, &config.logging);

        tracing::info!(
            metrics_url = %config.metrics.url,
            logs_url = %config.logging.url,
            source = %config.metrics.source,
            "Telemetry pipeline initialized"
        );

        Ok(Self {
            config,
            registry: Arc::new(MetricRegistry::new()),
            active_users: Arc::new(ActiveUsers::new()),
            exporter,
        })
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    pub fn active_users(&self) -> &Arc<ActiveUsers> {
        &self.active_users
    }

    /// Log-emitting handle for other producers in the host service.
    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn instrumentation(&self) -> InstrumentationState {
        InstrumentationState::new(
            self.registry.clone(),
            self.active_users.clone(),
            self.exporter.clone(),
            &self.config.instrumentation,
        )
    }

    /// Wrap every route (and the fallback) of `router` with request
    /// instrumentation.
    pub fn instrument<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(middleware::from_fn_with_state(
            self.instrumentation(),
            instrument,
        ))
    }

    /// Build a sampler over an arbitrary probe.
    pub fn sampler<P: ResourceProbe>(&self, probe: P) -> PeriodicSampler<P> {
        PeriodicSampler::new(
            self.registry.clone(),
            self.active_users.clone(),
            self.exporter.clone(),
            probe,
            Duration::from_millis(self.config.sampler.period_ms),
        )
    }

    /// Start the host sampler if enabled in config.
    pub fn start_sampler(&self) -> Option<SamplerHandle> {
        if !self.config.sampler.enabled {
            tracing::info!("Periodic sampler disabled");
            return None;
        }
        Some(self.sampler(HostProbe).start())
    }

    /// Stop the sampler, then wait (bounded) for in-flight pushes.
    /// Returns true if every push finished in time.
    pub async fn shutdown(&self, sampler: Option<SamplerHandle>) -> bool {
        if let Some(handle) = sampler {
            handle.stop().await;
        }
        let timeout = Duration::from_millis(self.config.transport.drain_timeout_ms);
        self.exporter.transport().drain(timeout).await
    }
}
