//! Innermost implementations used when a downstream has no configured URL.
//!
//! The proxy middleware passes these through unchanged, so every call
//! reports the downstream as unavailable.

use super::{EventsService, UsersService};
use crate::errors::GatewayError;
use async_trait::async_trait;
use common::types::{
    DoorAuthenticateRequest, Events, UpdateAccessRequest, UpdateEventRequest, User,
};
use common::RequestContext;

const USERS: &str = "users service not configured";
const EVENTS: &str = "events service not configured";

/// `UsersService` that fails every call with `ServiceUnavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredUsers;

/// `EventsService` that fails every call with `ServiceUnavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredEvents;

#[async_trait]
impl UsersService for UnconfiguredUsers {
    async fn get_user(&self, _ctx: &RequestContext, _username: &str) -> Result<User, GatewayError> {
        Err(GatewayError::ServiceUnavailable(USERS.to_string()))
    }

    async fn door_authenticate(
        &self,
        _ctx: &RequestContext,
        _request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::ServiceUnavailable(USERS.to_string()))
    }

    async fn update_user_access(
        &self,
        _ctx: &RequestContext,
        _request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::ServiceUnavailable(USERS.to_string()))
    }
}

#[async_trait]
impl EventsService for UnconfiguredEvents {
    async fn get_events(
        &self,
        _ctx: &RequestContext,
        _username: &str,
    ) -> Result<Events, GatewayError> {
        Err(GatewayError::ServiceUnavailable(EVENTS.to_string()))
    }

    async fn update_events(
        &self,
        _ctx: &RequestContext,
        _request: &UpdateEventRequest,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::ServiceUnavailable(EVENTS.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_users_is_unavailable() {
        let result = UnconfiguredUsers
            .get_user(&RequestContext::default(), "abc")
            .await;
        assert!(matches!(result, Err(GatewayError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_events_is_unavailable() {
        let result = UnconfiguredEvents
            .get_events(&RequestContext::default(), "abc")
            .await;
        assert!(matches!(result, Err(GatewayError::ServiceUnavailable(_))));
    }
}
