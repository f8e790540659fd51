//! Users service proxy.

use super::endpoint::{decode_json, encode_json_body, encode_username_query};
use super::{make_proxy_endpoint, BoxEndpoint, ProxyConfig};
use crate::errors::GatewayError;
use crate::services::{Middleware, UsersService};
use async_trait::async_trait;
use common::types::{DoorAuthenticateRequest, UpdateAccessRequest, User};
use common::RequestContext;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// `UsersService` backed by retrying HTTP endpoints.
pub struct UsersProxy {
    get_user: BoxEndpoint<String, User>,
    door_authenticate: BoxEndpoint<DoorAuthenticateRequest, String>,
    update_user_access: BoxEndpoint<UpdateAccessRequest, String>,
}

impl UsersProxy {
    /// Build the proxy from the three operation configs.
    ///
    /// Returns `None` if any target URL is missing.
    pub fn new(
        client: &Client,
        get_user: &ProxyConfig,
        door_authenticate: &ProxyConfig,
        update_user_access: &ProxyConfig,
    ) -> Option<Self> {
        let (Some(get_user_url), Some(authenticate_url), Some(update_url)) = (
            get_user.url.clone(),
            door_authenticate.url.clone(),
            update_user_access.url.clone(),
        ) else {
            return None;
        };

        Some(Self {
            get_user: make_proxy_endpoint(
                "GetUser",
                client,
                get_user_url,
                get_user,
                encode_username_query,
                decode_json::<User>,
            ),
            door_authenticate: make_proxy_endpoint(
                "DoorAuthenticate",
                client,
                authenticate_url,
                door_authenticate,
                encode_json_body::<DoorAuthenticateRequest>,
                decode_json::<String>,
            ),
            update_user_access: make_proxy_endpoint(
                "UpdateUserAccess",
                client,
                update_url,
                update_user_access,
                encode_json_body::<UpdateAccessRequest>,
                decode_json::<String>,
            ),
        })
    }
}

/// Middleware that replaces the wrapped users service with the HTTP proxy.
///
/// When any URL is missing the middleware is a pass-through that returns
/// the wrapped implementation unchanged.
pub fn new_users_proxy(
    client: &Client,
    get_user: &ProxyConfig,
    door_authenticate: &ProxyConfig,
    update_user_access: &ProxyConfig,
) -> Middleware<dyn UsersService> {
    match UsersProxy::new(client, get_user, door_authenticate, update_user_access) {
        Some(proxy) => {
            let proxy: Arc<dyn UsersService> = Arc::new(proxy);
            Box::new(move |_next| proxy)
        }
        None => {
            info!(target: "door.proxy", "Users service URL not configured, using pass-through");
            Box::new(|next| next)
        }
    }
}

#[async_trait]
impl UsersService for UsersProxy {
    async fn get_user(&self, ctx: &RequestContext, username: &str) -> Result<User, GatewayError> {
        self.get_user.call(ctx, &username.to_owned()).await
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError> {
        self.door_authenticate.call(ctx, request).await
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError> {
        self.update_user_access.call(ctx, request).await
    }
}
