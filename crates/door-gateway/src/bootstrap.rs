//! Startup composition of the service chain.
//!
//! Each downstream is built as proxy -> logging -> instrumenting over a
//! fallback implementation, and the inbound service as business logic ->
//! logging -> instrumenting. The fallback only receives calls when the
//! downstream URL is not configured and the proxy passes through.

use crate::config::{Config, ConfigError};
use crate::middleware::{
    new_events_instrumenting_middleware, new_events_logging_middleware,
    new_instrumenting_middleware, new_logging_middleware, new_users_instrumenting_middleware,
    new_users_logging_middleware,
};
use crate::observability::metrics::{
    instrumentation, EVENTS_PROXY_METRICS, SERVICE_METRICS, USERS_PROXY_METRICS,
};
use crate::proxy::{new_events_proxy, new_users_proxy};
use crate::routes::AppState;
use crate::services::{DoorAccessService, EventsService, Middleware, Service, UsersService};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// Fully decorated downstream services.
#[derive(Clone)]
pub struct Downstreams {
    pub users: Arc<dyn UsersService>,
    pub events: Arc<dyn EventsService>,
}

/// Apply `middlewares` to `inner` in order; the last one ends up outermost.
pub fn chain<S: ?Sized>(inner: Arc<S>, middlewares: Vec<Middleware<S>>) -> Arc<S> {
    middlewares.into_iter().fold(inner, |next, middleware| middleware(next))
}

/// Build the decorated users and events services.
///
/// # Errors
///
/// Returns `ConfigError::InvalidUrl` if an operation path cannot be joined
/// onto its downstream base URL.
pub fn build_downstreams(
    config: &Config,
    client: &Client,
    users_fallback: Arc<dyn UsersService>,
    events_fallback: Arc<dyn EventsService>,
) -> Result<Downstreams, ConfigError> {
    let users = chain(
        users_fallback,
        vec![
            new_users_proxy(
                client,
                &config.get_user_proxy()?,
                &config.door_authenticate_proxy()?,
                &config.update_access_proxy()?,
            ),
            new_users_logging_middleware(),
            new_users_instrumenting_middleware(instrumentation(USERS_PROXY_METRICS, config)),
        ],
    );

    let events = chain(
        events_fallback,
        vec![
            new_events_proxy(
                client,
                &config.get_events_proxy()?,
                &config.update_events_proxy()?,
            ),
            new_events_logging_middleware(),
            new_events_instrumenting_middleware(instrumentation(EVENTS_PROXY_METRICS, config)),
        ],
    );

    info!(
        target: "door.bootstrap",
        users_configured = config.users_url.is_some(),
        events_configured = config.events_url.is_some(),
        max_attempts = config.outbound_max_attempts,
        max_time_ms = u64::try_from(config.outbound_max_time.as_millis()).unwrap_or(u64::MAX),
        "Downstream services composed"
    );

    Ok(Downstreams { users, events })
}

/// Build the decorated inbound service over `downstreams`.
pub fn build_service(config: &Config, downstreams: Downstreams) -> Arc<dyn Service> {
    let base: Arc<dyn Service> = Arc::new(DoorAccessService::new(
        downstreams.users,
        downstreams.events,
    ));

    chain(
        base,
        vec![
            new_logging_middleware(),
            new_instrumenting_middleware(instrumentation(SERVICE_METRICS, config)),
        ],
    )
}

/// Build the application state for `config`.
///
/// # Errors
///
/// See [`build_downstreams`].
pub fn build_app_state(
    config: Config,
    client: &Client,
    users_fallback: Arc<dyn UsersService>,
    events_fallback: Arc<dyn EventsService>,
) -> Result<Arc<AppState>, ConfigError> {
    let downstreams = build_downstreams(&config, client, users_fallback, events_fallback)?;
    let service = build_service(&config, downstreams);

    Ok(Arc::new(AppState { service, config }))
}
