//! Service layer for the door gateway.
//!
//! Defines the three contracts every layer is written against:
//!
//! - `Service` - the inbound door-access operations
//! - `UsersService` - identity and authorization, owned by the users service
//! - `EventsService` - access history, owned by the events service
//!
//! Business logic, proxies and observability decorators all implement the
//! same contracts, so any layer can be replaced by a test double.
//!
//! # Components
//!
//! - `door_access` - door-access business rules
//! - `formatter` - user response formatting
//! - `unconfigured` - fallbacks used when no downstream URL is configured
//! - `mock` - spy doubles for tests

pub mod door_access;
pub mod formatter;
pub mod mock;
pub mod unconfigured;

use crate::errors::GatewayError;
use crate::models::UserResponse;
use async_trait::async_trait;
use common::types::{
    DoorAuthenticateRequest, Events, UpdateAccessRequest, UpdateEventRequest, User,
};
use common::RequestContext;
use std::sync::Arc;

pub use door_access::DoorAccessService;
pub use formatter::format_events;
pub use mock::{MockEventsService, MockUsersService};
pub use unconfigured::{UnconfiguredEvents, UnconfiguredUsers};

/// A same-contract wrapper: takes the next component and returns the
/// component that wraps it.
pub type Middleware<S> = Box<dyn FnOnce(Arc<S>) -> Arc<S> + Send>;

/// Inbound door-access operations.
#[async_trait]
pub trait Service: Send + Sync {
    /// Liveness probe.
    async fn check(&self, ctx: &RequestContext) -> Result<bool, GatewayError>;

    /// Identity plus formatted access history for `username`.
    async fn get_user(&self, ctx: &RequestContext, username: &str)
        -> Result<UserResponse, GatewayError>;

    /// Change an access grant. Requires the acting user to be an admin.
    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<(), GatewayError>;

    /// Decide a door-access attempt, recording an event on grant.
    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<bool, GatewayError>;
}

/// Users service contract.
#[async_trait]
pub trait UsersService: Send + Sync {
    async fn get_user(&self, ctx: &RequestContext, username: &str) -> Result<User, GatewayError>;

    /// Returns the free-text access outcome.
    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError>;

    /// Returns the users service's update result.
    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError>;
}

/// Events service contract.
#[async_trait]
pub trait EventsService: Send + Sync {
    async fn get_events(&self, ctx: &RequestContext, username: &str)
        -> Result<Events, GatewayError>;

    async fn update_events(
        &self,
        ctx: &RequestContext,
        request: &UpdateEventRequest,
    ) -> Result<String, GatewayError>;
}
