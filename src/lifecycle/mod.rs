//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → shutdown_signal resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → sampler loop exits
//!         → transport drains in-flight pushes (bounded)
//! ```
//!
//! # Design Decisions
//! - Every background loop subscribes to a broadcast, none is detached
//! - Drain has a timeout: pushes still in flight after it are abandoned

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
