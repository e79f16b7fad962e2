//! Telemetry state subsystem.
//!
//! # Data Flow
//! ```text
//! http middleware ─┐
//!                  ├─→ registry.rs (counters, gauges)
//! sampler ─────────┘   active_users.rs (session set)
//!                          → export (envelopes → transport)
//! ```
//!
//! # Design Decisions
//! - Owned by `Pipeline` and shared through `Arc`, never a static
//! - No I/O here; exporting is the caller's job

pub mod active_users;
pub mod names;
pub mod record;
pub mod registry;

pub use active_users::ActiveUsers;
pub use record::{
    unix_nanos, LogLevel, LogRecord, MetricKind, MetricRecord, MetricValue, RequestKey, SeriesKey,
};
pub use registry::MetricRegistry;
