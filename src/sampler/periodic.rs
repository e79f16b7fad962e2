//! Timer-driven host and session sampling.
//!
//! # States
//! - Idle: waiting for the next tick
//! - Sampling: reading probes and pushing gauges
//!
//! # State Transitions
//! ```text
//! Idle → Sampling: timer tick
//! Sampling → Idle: tick finished (success or error)
//! ```
//!
//! # Design Decisions
//! - The timer is the only source of scheduling
//! - A failed tick is logged and never cancels later ticks
//! - Stopped explicitly through `SamplerHandle::stop`

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::SamplerError;
use crate::export::Exporter;
use crate::lifecycle::Shutdown;
use crate::sampler::probe::ResourceProbe;
use crate::telemetry::names::*;
use crate::telemetry::{ActiveUsers, MetricRecord, MetricRegistry, SeriesKey};

/// Sampler state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle = 0,
    Sampling = 1,
}

impl From<u8> for SamplerState {
    fn from(val: u8) -> Self {
        match val {
            1 => SamplerState::Sampling,
            _ => SamplerState::Idle,
        }
    }
}

/// Tick bookkeeping shared with the handle.
#[derive(Debug, Default)]
pub struct SamplerStats {
    state: AtomicU8,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl SamplerStats {
    pub fn state(&self) -> SamplerState {
        SamplerState::from(self.state.load(Ordering::Acquire))
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Periodically samples CPU, memory and active sessions.
pub struct PeriodicSampler<P: ResourceProbe> {
    registry: Arc<MetricRegistry>,
    active_users: Arc<ActiveUsers>,
    exporter: Exporter,
    probe: P,
    period: Duration,
    stats: Arc<SamplerStats>,
}

impl<P: ResourceProbe> PeriodicSampler<P> {
    pub fn new(
        registry: Arc<MetricRegistry>,
        active_users: Arc<ActiveUsers>,
        exporter: Exporter,
        probe: P,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            active_users,
            exporter,
            probe,
            period,
            stats: Arc::new(SamplerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<SamplerStats> {
        self.stats.clone()
    }

    /// Take one sample: read probes, update gauges, push them.
    pub fn tick(&self) -> Result<(), SamplerError> {
        self.stats
            .state
            .store(SamplerState::Sampling as u8, Ordering::Release);
        let result = self.sample();
        self.stats
            .state
            .store(SamplerState::Idle as u8, Ordering::Release);

        match result {
            Ok(records) => {
                for record in &records {
                    self.exporter.push_metric(record);
                }
                self.stats.completed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn sample(&self) -> Result<Vec<MetricRecord>, SamplerError> {
        let cpu = self.probe.cpu_percent()?;
        let memory = self.probe.memory_percent()?;
        let users = self.active_users.len() as f64;

        let readings = [
            (CPU_USAGE_PERCENTAGE, UNIT_PERCENT, cpu),
            (MEMORY_USAGE_PERCENTAGE, UNIT_PERCENT, memory),
            (ACTIVE_USERS, UNIT_USERS, users),
        ];
        let mut records = Vec::with_capacity(readings.len());
        for (name, unit, value) in readings {
            let key = SeriesKey::new(name);
            self.registry.set_gauge(&key, unit, value)?;
            records.push(MetricRecord::gauge(&key, unit, value));
        }
        Ok(records)
    }

    /// Spawn the sampling loop. The first tick fires one period from now.
    pub fn start(self) -> SamplerHandle {
        let shutdown = Shutdown::new();
        let stats = self.stats.clone();
        let stop = shutdown.subscribe();
        let task = tokio::spawn(self.run(stop));
        SamplerHandle {
            shutdown,
            stats,
            task,
        }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(period_ms = self.period.as_millis() as u64, "Sampler starting");

        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick() {
                        tracing::error!(error = %e, "Sampling tick failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Sampler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Running sampler; stop it explicitly.
pub struct SamplerHandle {
    shutdown: Shutdown,
    stats: Arc<SamplerStats>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Sampler task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, MetricsConfig, TransportConfig};
    use crate::export::Transport;
    use crate::telemetry::MetricValue;

    struct FixedProbe;

    impl ResourceProbe for FixedProbe {
        fn cpu_percent(&self) -> Result<f64, SamplerError> {
            Ok(37.25)
        }

        fn memory_percent(&self) -> Result<f64, SamplerError> {
            Ok(61.0)
        }
    }

    struct BrokenProbe;

    impl ResourceProbe for BrokenProbe {
        fn cpu_percent(&self) -> Result<f64, SamplerError> {
            Err(SamplerError::Probe("load average unavailable".into()))
        }

        fn memory_percent(&self) -> Result<f64, SamplerError> {
            Ok(1.0)
        }
    }

    fn offline_exporter() -> Exporter {
        let metrics = MetricsConfig {
            url: "http://127.0.0.1:9/v1/metrics".into(),
            ..Default::default()
        };
        let logging = LoggingConfig {
            url: "http://127.0.0.1:9/push".into(),
            ..Default::default()
        };
        let transport = Transport::new(&TransportConfig::default()).unwrap();
        Exporter::new(transport, &metrics, &logging)
    }

    #[tokio::test]
    async fn test_tick_sets_three_gauges() {
        let registry = Arc::new(MetricRegistry::new());
        let users = Arc::new(ActiveUsers::new());
        users.observe("t1");
        users.observe("t2");

        let sampler = PeriodicSampler::new(
            registry.clone(),
            users,
            offline_exporter(),
            FixedProbe,
            Duration::from_secs(10),
        );
        sampler.tick().unwrap();

        let value = |name: &str| registry.get(&SeriesKey::new(name)).unwrap().value;
        assert_eq!(value(CPU_USAGE_PERCENTAGE), MetricValue::Point(37.25));
        assert_eq!(value(MEMORY_USAGE_PERCENTAGE), MetricValue::Point(61.0));
        assert_eq!(value(ACTIVE_USERS), MetricValue::Point(2.0));
        assert_eq!(sampler.stats().completed(), 1);
        assert_eq!(sampler.stats().state(), SamplerState::Idle);
    }

    #[tokio::test]
    async fn test_failed_tick_writes_nothing() {
        let registry = Arc::new(MetricRegistry::new());
        let sampler = PeriodicSampler::new(
            registry.clone(),
            Arc::new(ActiveUsers::new()),
            offline_exporter(),
            BrokenProbe,
            Duration::from_secs(10),
        );

        assert!(matches!(sampler.tick(), Err(SamplerError::Probe(_))));
        assert!(registry.is_empty());
        assert_eq!(sampler.stats().failed(), 1);
        assert_eq!(sampler.stats().state(), SamplerState::Idle);
    }
}
