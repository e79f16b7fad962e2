//! Periodic sampling subsystem.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → probe.rs (CPU load, memory usage)
//!     → ActiveUsers size
//!     → registry gauges → exporter
//! ```

pub mod periodic;
pub mod probe;

pub use periodic::{PeriodicSampler, SamplerHandle, SamplerState, SamplerStats};
pub use probe::{HostProbe, ResourceProbe};
