//! Door Gateway Library
//!
//! Authenticates door-access attempts, authorizes access-grant changes and
//! records access events by delegating to the downstream users and events
//! services over HTTP.
//!
//! # Modules
//!
//! - `bootstrap` - Startup composition of the service chain
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Logging/metrics decorators and HTTP middleware
//! - `models` - Request and response models
//! - `observability` - Metrics definitions and Prometheus recorder
//! - `proxy` - Retrying, load-balanced downstream clients
//! - `routes` - Axum routers and application state
//! - `services` - Service contracts and door-access business logic

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod proxy;
pub mod routes;
pub mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "door=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// Output is JSON when `LOG_FORMAT=json`, human-readable otherwise.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
