//! HTTP routes for the door gateway.
//!
//! Defines the Axum routers and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::request_context_middleware;
use crate::services::Service;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Fully composed inbound service (business logic plus decorators).
    pub service: Arc<dyn Service>,

    /// Service configuration.
    pub config: Config,
}

/// Route prefix built from the base path and version, e.g. `/dooraccess/v1`.
///
/// Empty segments are skipped; an empty result mounts routes at the root.
pub fn api_prefix(config: &Config) -> String {
    [config.base_path.as_str(), config.version.as_str()]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .fold(String::new(), |mut prefix, segment| {
            prefix.push('/');
            prefix.push_str(segment);
            prefix
        })
}

/// Build the application routes.
///
/// Creates an Axum router with, under `/{base_path}/{version}`:
/// - `GET /check` - Liveness probe
/// - `GET /getuser?username=` - User identity and access history
/// - `POST /updateuseraccess` - Change a door grant (admin only)
/// - `POST /doorauthenticate` - Decide a door-access attempt
///
/// Layers, innermost first: request timeout, access logging, request
/// context.
pub fn build_routes(state: Arc<AppState>) -> Router {
    let prefix = api_prefix(&state.config);
    let request_timeout = state.config.request_timeout;

    let api_routes = Router::new()
        .route("/check", get(handlers::check))
        .route("/getuser", get(handlers::get_user))
        .route("/updateuseraccess", post(handlers::update_user_access))
        .route("/doorauthenticate", post(handlers::door_authenticate))
        .with_state(state);

    let routes = if prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(&prefix, api_routes)
    };

    routes
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        // Outermost so every response, including timeouts, carries the request id.
        .layer(middleware::from_fn(request_context_middleware))
}

/// Router for the separate metrics listener.
pub fn metrics_routes(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::services::{DoorAccessService, MockEventsService, MockUsersService};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use crate::errors::GatewayError;
    use crate::services::EventsService;
    use async_trait::async_trait;
    use common::types::{Events, UpdateEventRequest, User};
    use common::RequestContext;
    use std::time::Duration;
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_vars(&vars).unwrap()
    }

    fn app(users: MockUsersService, events: MockEventsService) -> Router {
        let service = Arc::new(DoorAccessService::new(Arc::new(users), Arc::new(events)));
        build_routes(Arc::new(AppState {
            service,
            config: config(&[]),
        }))
    }

    /// Events double that answers only after `delay`.
    struct SlowEvents {
        delay: Duration,
    }

    #[async_trait]
    impl EventsService for SlowEvents {
        async fn get_events(
            &self,
            _ctx: &RequestContext,
            username: &str,
        ) -> Result<Events, GatewayError> {
            tokio::time::sleep(self.delay).await;
            Ok(Events {
                username: username.to_string(),
                events: Vec::new(),
            })
        }

        async fn update_events(
            &self,
            _ctx: &RequestContext,
            _request: &UpdateEventRequest,
        ) -> Result<String, GatewayError> {
            tokio::time::sleep(self.delay).await;
            Ok("ok".to_string())
        }
    }

    fn default_app() -> Router {
        app(MockUsersService::new(), MockEventsService::new())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_api_prefix() {
        assert_eq!(api_prefix(&config(&[])), "/dooraccess/v1");
        assert_eq!(
            api_prefix(&config(&[("SERVICE_BASE_PATH", "/doors/"), ("SERVICE_VERSION", "v2")])),
            "/doors/v2"
        );
        assert_eq!(
            api_prefix(&config(&[("SERVICE_BASE_PATH", ""), ("SERVICE_VERSION", "")])),
            ""
        );
    }

    #[tokio::test]
    async fn test_check() {
        let request = Request::get("/dooraccess/v1/check")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(default_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
    }

    #[tokio::test]
    async fn test_get_user_returns_userinfo_and_events() {
        let request = Request::get("/dooraccess/v1/getuser?username=abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(default_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userinfo"]["username"], "abc");
        assert_eq!(body["events"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_denied_door_is_unauthorized() {
        let users = MockUsersService::new().with_outcome("not authorized");
        let request = post_json(
            "/dooraccess/v1/doorauthenticate",
            serde_json::json!({"username": "abc", "access_door": "Door1"}),
        );

        let (status, body) = send(app(users, MockEventsService::new()), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "ACCESS_DENIED");
        assert_eq!(body["error"]["message"], "User does not have access to Door1");
    }

    #[tokio::test]
    async fn test_granted_door() {
        let request = post_json(
            "/dooraccess/v1/doorauthenticate",
            serde_json::json!({"username": "abc", "access_door": "Door1"}),
        );

        let (status, body) = send(default_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_access"], true);
    }

    #[tokio::test]
    async fn test_non_admin_update_is_forbidden() {
        let request = post_json(
            "/dooraccess/v1/updateuseraccess",
            serde_json::json!({"username": "abc", "access_door": "Door1", "has_access": true}),
        );

        let (status, body) = send(default_app(), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "ADMIN_REQUIRED");
    }

    #[tokio::test]
    async fn test_admin_update_succeeds() {
        let users = MockUsersService::new().with_user(User {
            username: "admin".to_string(),
            is_admin: true,
            ..Default::default()
        });
        let request = post_json(
            "/dooraccess/v1/updateuseraccess",
            serde_json::json!({"username": "admin", "access_door": "Door1", "has_access": false}),
        );

        let (status, body) = send(app(users, MockEventsService::new()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], true);
    }

    #[tokio::test]
    async fn test_unavailable_downstream_is_503() {
        let request = Request::get("/dooraccess/v1/getuser?username=abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) =
            send(app(MockUsersService::failing(), MockEventsService::new()), request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_routes_outside_prefix_are_not_found() {
        let request = Request::get("/check").body(Body::empty()).unwrap();

        let (status, _) = send(default_app(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_deadline_aborts_slow_call() {
        let service = Arc::new(DoorAccessService::new(
            Arc::new(MockUsersService::new()),
            Arc::new(SlowEvents {
                delay: Duration::from_secs(5),
            }),
        ));
        let app = build_routes(Arc::new(AppState {
            service,
            config: config(&[("REQUEST_TIMEOUT_MS", "100")]),
        }));
        let request = Request::get("/dooraccess/v1/getuser?username=abc")
            .body(Body::empty())
            .unwrap();

        let started = std::time::Instant::now();
        let (status, _) = send(app, request).await;
        let elapsed = started.elapsed();

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(
            elapsed < Duration::from_secs(2),
            "slow call held the request for {:?}",
            elapsed
        );
    }
}
