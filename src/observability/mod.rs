//! Observability of the pipeline itself.
//!
//! # Design Decisions
//! - Uses the `tracing` crate with structured fields throughout
//! - Filter configurable through `RUST_LOG`

pub mod logging;
