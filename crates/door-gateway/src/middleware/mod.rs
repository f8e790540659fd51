//! Middleware for the door gateway.
//!
//! # Components
//!
//! - `logging` - logging decorators over the service contracts
//! - `instrumenting` - metrics decorators over the service contracts
//! - `request_context` - HTTP middleware building the per-request context

pub mod instrumenting;
pub mod logging;
pub mod request_context;

pub use instrumenting::{
    new_events_instrumenting_middleware, new_instrumenting_middleware,
    new_users_instrumenting_middleware, Instrumentation, MetricNames,
};
pub use logging::{
    new_events_logging_middleware, new_logging_middleware, new_users_logging_middleware,
};
pub use request_context::request_context_middleware;
