//! HTTP instrumentation subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware/instrument.rs (start timer, note session)
//!     → host service handler
//!     → middleware/instrument.rs (buffer bodies, record metrics)
//!         → purchase.rs (order items → purchase count, revenue)
//!         → sanitize.rs (redact secrets before logging)
//!     → response to client; export runs detached
//! ```

pub mod middleware;
pub mod purchase;
pub mod sanitize;

pub use middleware::{instrument, InstrumentationState};
pub use sanitize::sanitize;
