//! Events service proxy.

use super::endpoint::{decode_json, encode_json_body, encode_username_query};
use super::{make_proxy_endpoint, BoxEndpoint, ProxyConfig};
use crate::errors::GatewayError;
use crate::services::{EventsService, Middleware};
use async_trait::async_trait;
use common::types::{Events, UpdateEventRequest};
use common::RequestContext;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// `EventsService` backed by retrying HTTP endpoints.
pub struct EventsProxy {
    get_events: BoxEndpoint<String, Events>,
    update_events: BoxEndpoint<UpdateEventRequest, String>,
}

impl EventsProxy {
    /// Returns `None` if either target URL is missing.
    pub fn new(
        client: &Client,
        get_events: &ProxyConfig,
        update_events: &ProxyConfig,
    ) -> Option<Self> {
        let (Some(get_url), Some(update_url)) = (get_events.url.clone(), update_events.url.clone())
        else {
            return None;
        };

        Some(Self {
            get_events: make_proxy_endpoint(
                "GetEvents",
                client,
                get_url,
                get_events,
                encode_username_query,
                decode_json::<Events>,
            ),
            update_events: make_proxy_endpoint(
                "UpdateEvents",
                client,
                update_url,
                update_events,
                encode_json_body::<UpdateEventRequest>,
                decode_json::<String>,
            ),
        })
    }
}

/// Middleware that replaces the wrapped events service with the HTTP proxy,
/// or passes it through unchanged when a URL is missing.
pub fn new_events_proxy(
    client: &Client,
    get_events: &ProxyConfig,
    update_events: &ProxyConfig,
) -> Middleware<dyn EventsService> {
    match EventsProxy::new(client, get_events, update_events) {
        Some(proxy) => {
            let proxy: Arc<dyn EventsService> = Arc::new(proxy);
            Box::new(move |_next| proxy)
        }
        None => {
            info!(target: "door.proxy", "Events service URL not configured, using pass-through");
            Box::new(|next| next)
        }
    }
}

#[async_trait]
impl EventsService for EventsProxy {
    async fn get_events(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Events, GatewayError> {
        self.get_events.call(ctx, &username.to_owned()).await
    }

    async fn update_events(
        &self,
        ctx: &RequestContext,
        request: &UpdateEventRequest,
    ) -> Result<String, GatewayError> {
        self.update_events.call(ctx, request).await
    }
}
