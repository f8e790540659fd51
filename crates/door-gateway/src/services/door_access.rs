//! Door-access business rules.
//!
//! All authorization decisions are delegated to the users service; this
//! layer only interprets its answers and records grants with the events
//! service.

use super::formatter::format_events;
use super::{EventsService, Service, UsersService};
use crate::errors::GatewayError;
use crate::models::UserResponse;
use async_trait::async_trait;
use common::types::{DoorAuthenticateRequest, Event, UpdateAccessRequest, UpdateEventRequest};
use common::RequestContext;
use std::sync::Arc;
use tracing::{debug, warn};

/// Substring marking a denied access outcome from the users service.
const DENIED_MARKER: &str = "not";

/// Whether a users-service access outcome grants access.
///
/// The outcome is free text; any occurrence of `"not"` (case-sensitive)
/// is a denial.
pub fn outcome_grants_access(outcome: &str) -> bool {
    !outcome.contains(DENIED_MARKER)
}

/// The inbound `Service` implementation.
pub struct DoorAccessService {
    users: Arc<dyn UsersService>,
    events: Arc<dyn EventsService>,
}

impl DoorAccessService {
    pub fn new(users: Arc<dyn UsersService>, events: Arc<dyn EventsService>) -> Self {
        Self { users, events }
    }
}

#[async_trait]
impl Service for DoorAccessService {
    async fn check(&self, _ctx: &RequestContext) -> Result<bool, GatewayError> {
        Ok(true)
    }

    async fn get_user(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<UserResponse, GatewayError> {
        let user = self.users.get_user(ctx, username).await?;
        let events = self.events.get_events(ctx, username).await?;

        Ok(format_events(user, &events))
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<(), GatewayError> {
        // Admin status is re-read on every update.
        let actor = self.users.get_user(ctx, &request.username).await?;
        if !actor.is_admin {
            debug!(
                target: "door.service",
                username = %request.username,
                "Access update rejected for non-admin user"
            );
            return Err(GatewayError::AuthorizationDenied);
        }

        self.users.update_user_access(ctx, request).await?;
        Ok(())
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<bool, GatewayError> {
        let outcome = self.users.door_authenticate(ctx, request).await?;

        if !outcome_grants_access(&outcome) {
            return Err(GatewayError::AccessDenied(request.access_door.clone()));
        }

        let mut event = Event::new();
        event.insert(request.access_door.clone(), chrono::Utc::now().timestamp());
        let record = UpdateEventRequest {
            username: request.username.clone(),
            event,
        };

        // A failed write does not revoke the grant.
        if let Err(e) = self.events.update_events(ctx, &record).await {
            warn!(
                target: "door.service",
                username = %request.username,
                door = %request.access_door,
                request_id = %ctx.request_id,
                error = %e,
                "Access granted but event was not recorded"
            );
        }

        Ok(true)
    }
}
