//! Outbound export subsystem.
//!
//! # Data Flow
//! ```text
//! MetricRecord / LogRecord
//!     → envelope.rs (OTLP JSON / log stream JSON)
//!     → transport.rs (detached authenticated POST)
//!     → remote backend
//! ```
//!
//! # Design Decisions
//! - Encoders are pure and total
//! - Transport is the only component touching the network
//! - Failures stop at the transport boundary

pub mod envelope;
pub mod exporter;
pub mod transport;

pub use envelope::{encode_log, encode_metric, LogsEnvelope, MetricsEnvelope};
pub use exporter::Exporter;
pub use transport::{PushTarget, Transport, TransportStats};
