//! In-process telemetry pipeline for a web service.
//!
//! Observes HTTP requests, domain purchases and host resources, keeps
//! counters and gauges in memory, and pushes them (plus one structured log
//! line per request) to a remote metrics/log backend on a best-effort basis.

pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod sampler;
pub mod telemetry;

pub use config::TelemetryConfig;
pub use lifecycle::Shutdown;
pub use pipeline::Pipeline;
