//! Observability for the door gateway.
//!
//! Provides metrics definitions and the Prometheus recorder.

pub mod metrics;
