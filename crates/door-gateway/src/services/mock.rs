//! Spy doubles for the downstream contracts.
//!
//! Both mocks count every call and keep the write requests they receive so
//! tests can assert exactly what reached the downstream side.

use super::{EventsService, UsersService};
use crate::errors::GatewayError;
use async_trait::async_trait;
use common::types::{
    DoorAuthenticateRequest, Events, UpdateAccessRequest, UpdateEventRequest, User,
};
use common::RequestContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Mock users service.
pub struct MockUsersService {
    /// Returned from `get_user`. `None` echoes the requested username.
    user: Option<User>,
    /// Returned from `door_authenticate`.
    outcome: String,
    return_error: bool,
    get_user_calls: AtomicUsize,
    door_authenticate_calls: AtomicUsize,
    update_user_access_calls: AtomicUsize,
    updates: Mutex<Vec<UpdateAccessRequest>>,
}

impl Default for MockUsersService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUsersService {
    /// A mock that authorizes every door and returns a non-admin user.
    pub fn new() -> Self {
        Self {
            user: None,
            outcome: "authorized".to_string(),
            return_error: false,
            get_user_calls: AtomicUsize::new(0),
            door_authenticate_calls: AtomicUsize::new(0),
            update_user_access_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            return_error: true,
            ..Self::new()
        }
    }

    /// Return `user` from every `get_user` call.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Return `outcome` from every `door_authenticate` call.
    #[must_use]
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = outcome.into();
        self
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn door_authenticate_calls(&self) -> usize {
        self.door_authenticate_calls.load(Ordering::SeqCst)
    }

    pub fn update_user_access_calls(&self) -> usize {
        self.update_user_access_calls.load(Ordering::SeqCst)
    }

    /// Update requests received, in call order.
    pub async fn updates(&self) -> Vec<UpdateAccessRequest> {
        self.updates.lock().await.clone()
    }

    fn error(&self) -> GatewayError {
        GatewayError::ServiceUnavailable("Mock users service error".to_string())
    }
}

#[async_trait]
impl UsersService for MockUsersService {
    async fn get_user(&self, _ctx: &RequestContext, username: &str) -> Result<User, GatewayError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        if self.return_error {
            return Err(self.error());
        }

        Ok(self.user.clone().unwrap_or_else(|| User {
            id: username.to_string(),
            username: username.to_string(),
            ..Default::default()
        }))
    }

    async fn door_authenticate(
        &self,
        _ctx: &RequestContext,
        _request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError> {
        self.door_authenticate_calls.fetch_add(1, Ordering::SeqCst);
        if self.return_error {
            return Err(self.error());
        }
        Ok(self.outcome.clone())
    }

    async fn update_user_access(
        &self,
        _ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError> {
        self.update_user_access_calls.fetch_add(1, Ordering::SeqCst);
        if self.return_error {
            return Err(self.error());
        }
        self.updates.lock().await.push(request.clone());
        Ok("updated".to_string())
    }
}

/// Mock events service.
pub struct MockEventsService {
    events: Events,
    fail_reads: bool,
    fail_writes: bool,
    get_events_calls: AtomicUsize,
    update_events_calls: AtomicUsize,
    recorded: Mutex<Vec<UpdateEventRequest>>,
}

impl Default for MockEventsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEventsService {
    /// A mock with no stored events that accepts every write.
    pub fn new() -> Self {
        Self {
            events: Events::default(),
            fail_reads: false,
            fail_writes: false,
            get_events_calls: AtomicUsize::new(0),
            update_events_calls: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Return `events` from every `get_events` call.
    #[must_use]
    pub fn with_events(mut self, events: Events) -> Self {
        self.events = events;
        self
    }

    /// Fail `update_events` while reads keep succeeding.
    #[must_use]
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn get_events_calls(&self) -> usize {
        self.get_events_calls.load(Ordering::SeqCst)
    }

    pub fn update_events_calls(&self) -> usize {
        self.update_events_calls.load(Ordering::SeqCst)
    }

    /// Event writes received, in call order. Failed writes are not kept.
    pub async fn recorded(&self) -> Vec<UpdateEventRequest> {
        self.recorded.lock().await.clone()
    }

    fn error(&self) -> GatewayError {
        GatewayError::ServiceUnavailable("Mock events service error".to_string())
    }
}

#[async_trait]
impl EventsService for MockEventsService {
    async fn get_events(
        &self,
        _ctx: &RequestContext,
        username: &str,
    ) -> Result<Events, GatewayError> {
        self.get_events_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(self.error());
        }

        let mut events = self.events.clone();
        if events.username.is_empty() {
            events.username = username.to_string();
        }
        Ok(events)
    }

    async fn update_events(
        &self,
        _ctx: &RequestContext,
        request: &UpdateEventRequest,
    ) -> Result<String, GatewayError> {
        self.update_events_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(self.error());
        }
        self.recorded.lock().await.push(request.clone());
        Ok("recorded".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_users_mock_echoes_username_by_default() {
        let mock = MockUsersService::new();
        let user = mock
            .get_user(&RequestContext::default(), "abc")
            .await
            .unwrap();

        assert_eq!(user.username, "abc");
        assert!(!user.is_admin);
        assert_eq!(mock.get_user_calls(), 1);
    }

    #[tokio::test]
    async fn test_users_mock_records_updates() {
        let mock = MockUsersService::new();
        let request = UpdateAccessRequest {
            username: "admin".to_string(),
            access_door: "Door1".to_string(),
            has_access: true,
        };

        mock.update_user_access(&RequestContext::default(), &request)
            .await
            .unwrap();

        assert_eq!(mock.updates().await, vec![request]);
        assert_eq!(mock.update_user_access_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_users_mock_still_counts() {
        let mock = MockUsersService::failing();
        let result = mock
            .door_authenticate(
                &RequestContext::default(),
                &DoorAuthenticateRequest {
                    username: "abc".to_string(),
                    access_door: "Door1".to_string(),
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(mock.door_authenticate_calls(), 1);
    }

    #[tokio::test]
    async fn test_events_mock_failing_writes_keep_reads() {
        let mock = MockEventsService::new().with_failing_writes();
        let ctx = RequestContext::default();

        assert!(mock.get_events(&ctx, "abc").await.is_ok());
        let write = mock
            .update_events(
                &ctx,
                &UpdateEventRequest {
                    username: "abc".to_string(),
                    event: Default::default(),
                },
            )
            .await;

        assert!(write.is_err());
        assert_eq!(mock.update_events_calls(), 1);
        assert!(mock.recorded().await.is_empty());
    }
}
