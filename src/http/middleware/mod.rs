//! HTTP middleware.

pub mod instrument;

pub use instrument::{bearer_token, instrument, InstrumentationState, BODY_NOT_CAPTURED};
