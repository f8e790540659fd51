//! Logging decorators for the three service contracts.
//!
//! Each decorator forwards every call unchanged and emits one record per
//! call with the method name, elapsed time and request correlation ids.
//! Downstream failures are logged at `warn`; successes and domain
//! rejections (denied door, non-admin update) at `info`.

use crate::errors::GatewayError;
use crate::models::UserResponse;
use crate::services::{EventsService, Middleware, Service, UsersService};
use async_trait::async_trait;
use common::types::{
    DoorAuthenticateRequest, Events, UpdateAccessRequest, UpdateEventRequest, User,
};
use common::RequestContext;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Emit the per-call log record for `method`.
pub fn log_call<T>(
    layer: &'static str,
    method: &'static str,
    ctx: &RequestContext,
    begin: Instant,
    result: &Result<T, GatewayError>,
) {
    let took_ms = u64::try_from(begin.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(_) => info!(
            target: "door.calls",
            layer,
            method,
            took_ms,
            request_id = %ctx.request_id,
            forwarded_for = %ctx.forwarded_for,
            "Call completed"
        ),
        Err(e) if !e.is_downstream() => info!(
            target: "door.calls",
            layer,
            method,
            took_ms,
            request_id = %ctx.request_id,
            forwarded_for = %ctx.forwarded_for,
            error = %e,
            "Call rejected"
        ),
        Err(e) => warn!(
            target: "door.calls",
            layer,
            method,
            took_ms,
            request_id = %ctx.request_id,
            forwarded_for = %ctx.forwarded_for,
            error = %e,
            "Call failed"
        ),
    }
}

/// Logging decorator for the inbound `Service`.
pub struct LoggingService {
    next: Arc<dyn Service>,
}

/// Middleware wrapping a `Service` in [`LoggingService`].
pub fn new_logging_middleware() -> Middleware<dyn Service> {
    Box::new(|next| Arc::new(LoggingService { next }))
}

#[async_trait]
impl Service for LoggingService {
    async fn check(&self, ctx: &RequestContext) -> Result<bool, GatewayError> {
        let begin = Instant::now();
        let result = self.next.check(ctx).await;
        log_call("service", "Check", ctx, begin, &result);
        result
    }

    async fn get_user(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<UserResponse, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_user(ctx, username).await;
        log_call("service", "GetUser", ctx, begin, &result);
        result
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<(), GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_user_access(ctx, request).await;
        log_call("service", "UpdateUserAccess", ctx, begin, &result);
        result
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<bool, GatewayError> {
        let begin = Instant::now();
        let result = self.next.door_authenticate(ctx, request).await;
        log_call("service", "DoorAuthenticate", ctx, begin, &result);
        result
    }
}

/// Logging decorator for the users proxy.
pub struct LoggingUsersService {
    next: Arc<dyn UsersService>,
}

pub fn new_users_logging_middleware() -> Middleware<dyn UsersService> {
    Box::new(|next| Arc::new(LoggingUsersService { next }))
}

#[async_trait]
impl UsersService for LoggingUsersService {
    async fn get_user(&self, ctx: &RequestContext, username: &str) -> Result<User, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_user(ctx, username).await;
        log_call("users_proxy", "GetUserProxy", ctx, begin, &result);
        result
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.door_authenticate(ctx, request).await;
        log_call("users_proxy", "DoorAuthenticateProxy", ctx, begin, &result);
        result
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_user_access(ctx, request).await;
        log_call("users_proxy", "UpdateUserAccessProxy", ctx, begin, &result);
        result
    }
}

/// Logging decorator for the events proxy.
pub struct LoggingEventsService {
    next: Arc<dyn EventsService>,
}

pub fn new_events_logging_middleware() -> Middleware<dyn EventsService> {
    Box::new(|next| Arc::new(LoggingEventsService { next }))
}

#[async_trait]
impl EventsService for LoggingEventsService {
    async fn get_events(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Events, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_events(ctx, username).await;
        log_call("events_proxy", "GetEventsProxy", ctx, begin, &result);
        result
    }

    async fn update_events(
        &self,
        ctx: &RequestContext,
        request: &UpdateEventRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_events(ctx, request).await;
        log_call("events_proxy", "UpdateEventsProxy", ctx, begin, &result);
        result
    }
}
