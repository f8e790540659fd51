//! Metrics decorators for the three service contracts.
//!
//! All decorators share one [`Instrumentation`] helper so every layer
//! records identical semantics: one request count and one latency
//! observation per call, plus one error count iff the call failed.

use crate::errors::GatewayError;
use crate::models::UserResponse;
use crate::services::{EventsService, Middleware, Service, UsersService};
use async_trait::async_trait;
use common::types::{
    DoorAuthenticateRequest, Events, UpdateAccessRequest, UpdateEventRequest, User,
};
use common::RequestContext;
use metrics::{counter, histogram, Label};
use std::sync::Arc;
use std::time::Instant;

/// Metric family names recorded by one decorator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricNames {
    /// Counter of all calls.
    pub requests: &'static str,
    /// Counter of failed calls.
    pub errors: &'static str,
    /// Histogram of call latency in seconds.
    pub latency: &'static str,
}

/// Shared recording helper.
#[derive(Debug, Clone)]
pub struct Instrumentation {
    names: MetricNames,
    method_label: Option<String>,
    const_labels: Vec<Label>,
}

impl Instrumentation {
    /// The first of `label_names` is tagged with the method name. With no
    /// label names nothing is recorded.
    pub fn new(names: MetricNames, label_names: &[String], const_labels: Vec<Label>) -> Self {
        Self {
            names,
            method_label: label_names.first().cloned(),
            const_labels,
        }
    }

    pub fn names(&self) -> MetricNames {
        self.names
    }

    /// Record one completed call to `method` that started at `begin`.
    pub fn instrument(&self, method: &'static str, begin: Instant, failed: bool) {
        let Some(method_label) = &self.method_label else {
            return;
        };

        let mut labels = self.const_labels.clone();
        labels.push(Label::new(method_label.clone(), method));

        counter!(self.names.requests, labels.clone()).increment(1);
        histogram!(self.names.latency, labels.clone()).record(begin.elapsed().as_secs_f64());
        if failed {
            counter!(self.names.errors, labels).increment(1);
        }
    }
}

/// Metrics decorator for the inbound `Service`.
pub struct InstrumentingService {
    instrumentation: Instrumentation,
    next: Arc<dyn Service>,
}

pub fn new_instrumenting_middleware(instrumentation: Instrumentation) -> Middleware<dyn Service> {
    Box::new(move |next| {
        Arc::new(InstrumentingService {
            instrumentation,
            next,
        })
    })
}

#[async_trait]
impl Service for InstrumentingService {
    async fn check(&self, ctx: &RequestContext) -> Result<bool, GatewayError> {
        let begin = Instant::now();
        let result = self.next.check(ctx).await;
        self.instrumentation.instrument("Check", begin, result.is_err());
        result
    }

    async fn get_user(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<UserResponse, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_user(ctx, username).await;
        self.instrumentation.instrument("GetUser", begin, result.is_err());
        result
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<(), GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_user_access(ctx, request).await;
        self.instrumentation.instrument("UpdateUserAccess", begin, result.is_err());
        result
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<bool, GatewayError> {
        let begin = Instant::now();
        let result = self.next.door_authenticate(ctx, request).await;
        self.instrumentation.instrument("DoorAuthenticate", begin, result.is_err());
        result
    }
}

/// Metrics decorator for the users proxy.
pub struct InstrumentingUsersService {
    instrumentation: Instrumentation,
    next: Arc<dyn UsersService>,
}

pub fn new_users_instrumenting_middleware(
    instrumentation: Instrumentation,
) -> Middleware<dyn UsersService> {
    Box::new(move |next| {
        Arc::new(InstrumentingUsersService {
            instrumentation,
            next,
        })
    })
}

#[async_trait]
impl UsersService for InstrumentingUsersService {
    async fn get_user(&self, ctx: &RequestContext, username: &str) -> Result<User, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_user(ctx, username).await;
        self.instrumentation.instrument("GetUser", begin, result.is_err());
        result
    }

    async fn door_authenticate(
        &self,
        ctx: &RequestContext,
        request: &DoorAuthenticateRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.door_authenticate(ctx, request).await;
        self.instrumentation.instrument("DoorAuthenticate", begin, result.is_err());
        result
    }

    async fn update_user_access(
        &self,
        ctx: &RequestContext,
        request: &UpdateAccessRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_user_access(ctx, request).await;
        self.instrumentation.instrument("UpdateUserAccess", begin, result.is_err());
        result
    }
}

/// Metrics decorator for the events proxy.
pub struct InstrumentingEventsService {
    instrumentation: Instrumentation,
    next: Arc<dyn EventsService>,
}

pub fn new_events_instrumenting_middleware(
    instrumentation: Instrumentation,
) -> Middleware<dyn EventsService> {
    Box::new(move |next| {
        Arc::new(InstrumentingEventsService {
            instrumentation,
            next,
        })
    })
}

#[async_trait]
impl EventsService for InstrumentingEventsService {
    async fn get_events(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<Events, GatewayError> {
        let begin = Instant::now();
        let result = self.next.get_events(ctx, username).await;
        self.instrumentation.instrument("GetEvents", begin, result.is_err());
        result
    }

    async fn update_events(
        &self,
        ctx: &RequestContext,
        request: &UpdateEventRequest,
    ) -> Result<String, GatewayError> {
        let begin = Instant::now();
        let result = self.next.update_events(ctx, request).await;
        self.instrumentation.instrument("UpdateEvents", begin, result.is_err());
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::services::{DoorAccessService, MockEventsService, MockUsersService};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
    use std::collections::HashMap;
    use std::future::Future;

    const NAMES: MetricNames = MetricNames {
        requests: "test_requests_total",
        errors: "test_errors_total",
        latency: "test_latency_seconds",
    };

    fn instrumentation(label_names: &[&str]) -> Instrumentation {
        let label_names: Vec<String> = label_names.iter().map(|s| (*s).to_string()).collect();
        Instrumentation::new(
            NAMES,
            &label_names,
            vec![Label::new("service_name", "dooraccess")],
        )
    }

    /// Run `fut` with a local debugging recorder and return the snapshotter.
    fn recorded<F: Future>(fut: F) -> (F::Output, Snapshotter) {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let output = metrics::with_local_recorder(&recorder, || runtime.block_on(fut));
        (output, snapshotter)
    }

    /// Metric name to counter value or histogram sample count.
    fn observations(snapshotter: &Snapshotter) -> HashMap<String, u64> {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| {
                let n = match value {
                    DebugValue::Counter(count) => count,
                    DebugValue::Histogram(samples) => samples.len() as u64,
                    DebugValue::Gauge(_) => return None,
                };
                Some((key.key().name().to_string(), n))
            })
            .collect()
    }

    #[test]
    fn test_success_records_count_and_latency_only() {
        let mock = Arc::new(MockUsersService::new());
        let users = new_users_instrumenting_middleware(instrumentation(&["method"]))(mock);

        let (result, snapshotter) =
            recorded(async move { users.get_user(&RequestContext::default(), "abc").await });

        assert_eq!(result.unwrap().username, "abc");
        let seen = observations(&snapshotter);
        assert_eq!(seen.get("test_requests_total"), Some(&1));
        assert_eq!(seen.get("test_latency_seconds"), Some(&1));
        assert_eq!(seen.get("test_errors_total"), None);
    }

    #[test]
    fn test_failure_records_one_error() {
        let events = new_events_instrumenting_middleware(instrumentation(&["method"]))(Arc::new(
            MockEventsService::failing(),
        ));

        let (result, snapshotter) =
            recorded(async move { events.get_events(&RequestContext::default(), "abc").await });

        assert!(matches!(result, Err(GatewayError::ServiceUnavailable(_))));
        let seen = observations(&snapshotter);
        assert_eq!(seen.get("test_requests_total"), Some(&1));
        assert_eq!(seen.get("test_latency_seconds"), Some(&1));
        assert_eq!(seen.get("test_errors_total"), Some(&1));
    }

    #[test]
    fn test_labels_carry_method_and_const_labels() {
        let base: Arc<dyn Service> = Arc::new(DoorAccessService::new(
            Arc::new(MockUsersService::new()),
            Arc::new(MockEventsService::new()),
        ));
        let service = new_instrumenting_middleware(instrumentation(&["method", "unused"]))(base);

        let (_, snapshotter) =
            recorded(async move { service.check(&RequestContext::default()).await });

        let snapshot = snapshotter.snapshot().into_vec();
        let (key, _, _, _) = snapshot
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "test_requests_total")
            .unwrap();
        let labels: HashMap<&str, &str> = key
            .key()
            .labels()
            .map(|label| (label.key(), label.value()))
            .collect();

        assert_eq!(labels.get("method"), Some(&"Check"));
        assert_eq!(labels.get("service_name"), Some(&"dooraccess"));
        assert!(!labels.contains_key("unused"));
    }

    #[test]
    fn test_empty_label_set_records_nothing() {
        let middleware = new_users_instrumenting_middleware(instrumentation(&[]));
        let users = middleware(Arc::new(MockUsersService::new()));

        let (result, snapshotter) =
            recorded(async move { users.get_user(&RequestContext::default(), "abc").await });

        assert!(result.is_ok());
        assert!(observations(&snapshotter).is_empty());
    }

    #[test]
    fn test_domain_error_passes_through_unchanged() {
        let base: Arc<dyn Service> = Arc::new(DoorAccessService::new(
            Arc::new(MockUsersService::new()),
            Arc::new(MockEventsService::new()),
        ));
        let service = new_instrumenting_middleware(instrumentation(&["method"]))(base);
        let request = UpdateAccessRequest {
            username: "abc".to_string(),
            access_door: "Door1".to_string(),
            has_access: true,
        };

        let (result, snapshotter) = recorded(async move {
            service
                .update_user_access(&RequestContext::default(), &request)
                .await
        });

        assert!(matches!(result, Err(GatewayError::AuthorizationDenied)));
        assert_eq!(observations(&snapshotter).get("test_errors_total"), Some(&1));
    }
}
