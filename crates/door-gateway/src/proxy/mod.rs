//! Resilient proxy clients for the downstream users and events services.
//!
//! Each downstream operation is exposed as an [`Endpoint`] assembled from
//! three layers:
//!
//! ```text
//! Retry (attempt + wall-clock budget) -> RoundRobin (endpoint set) -> HttpEndpoint
//! ```
//!
//! [`UsersProxy`] and [`EventsProxy`] bundle those endpoints into
//! implementations of the `UsersService` / `EventsService` contracts. When a
//! target URL is missing from configuration the proxy constructors return a
//! pass-through middleware that forwards to the wrapped implementation.
//!
//! Retries are applied to every error kind, including the non-idempotent
//! `UpdateUserAccess` and `UpdateEvents` writes. Downstream services must
//! tolerate duplicate writes.

pub mod balancer;
pub mod endpoint;
pub mod events;
pub mod retry;
pub mod users;

use crate::errors::GatewayError;
use async_trait::async_trait;
use common::RequestContext;
use reqwest::{Client, Method, Url};
use std::sync::Arc;
use std::time::Duration;

pub use balancer::RoundRobin;
pub use endpoint::{DecodeResponseFn, EncodeRequestFn, HttpEndpoint};
pub use events::{new_events_proxy, EventsProxy};
pub use retry::Retry;
pub use users::{new_users_proxy, UsersProxy};

/// Static configuration for one downstream operation.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Target URL. `None` means the downstream is not configured.
    pub url: Option<Url>,

    /// HTTP method (GET for reads, POST for writes).
    pub method: Method,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Maximum wall-clock time across all attempts.
    pub max_time: Duration,
}

/// A callable remote operation, independent of transport detail.
#[async_trait]
pub trait Endpoint<Req, Resp>: Send + Sync
where
    Req: Send + Sync,
    Resp: Send,
{
    /// Invoke the operation once.
    async fn call(&self, ctx: &RequestContext, request: &Req) -> Result<Resp, GatewayError>;
}

/// Shared, type-erased endpoint.
pub type BoxEndpoint<Req, Resp> = Arc<dyn Endpoint<Req, Resp>>;

/// Build the retrying, load-balanced endpoint for one downstream operation.
///
/// The endpoint set currently holds the single configured URL; the balancer
/// accepts any number of members.
pub fn make_proxy_endpoint<Req, Resp>(
    name: &'static str,
    client: &Client,
    url: Url,
    config: &ProxyConfig,
    encode: EncodeRequestFn<Req>,
    decode: DecodeResponseFn<Resp>,
) -> BoxEndpoint<Req, Resp>
where
    Req: Send + Sync + 'static,
    Resp: Send + 'static,
{
    let http: BoxEndpoint<Req, Resp> = Arc::new(HttpEndpoint::new(
        name,
        client.clone(),
        config.method.clone(),
        url,
        encode,
        decode,
    ));

    let balancer: BoxEndpoint<Req, Resp> = Arc::new(RoundRobin::new(name, vec![http]));

    Arc::new(Retry::new(
        name,
        balancer,
        config.max_attempts,
        config.max_time,
    ))
}

/// Build the shared HTTP client used by every proxy endpoint.
///
/// # Errors
///
/// Returns `GatewayError::Internal` if the client cannot be built.
pub fn build_http_client(request_timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| {
            tracing::error!(target: "door.proxy", error = %e, "Failed to build HTTP client");
            GatewayError::Internal
        })
}
