//! Test server harness for E2E testing
//!
//! Provides `TestGatewayServer` for spawning real gateway instances in tests.

use door_gateway::bootstrap::build_app_state;
use door_gateway::config::Config;
use door_gateway::proxy::build_http_client;
use door_gateway::routes::{self, api_prefix};
use door_gateway::services::{EventsService, UsersService};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the door gateway in E2E tests.
///
/// The full service chain is built exactly as in production. The injected
/// users/events implementations receive calls only when the matching
/// `*_SERVICE_URL` variable is absent.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_check_e2e() -> Result<()> {
///     let server = TestGatewayServer::spawn(
///         Arc::new(MockUsersService::new()),
///         Arc::new(MockEventsService::new()),
///     )
///     .await?;
///
///     let response = reqwest::get(server.api_url("/check")).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestGatewayServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestGatewayServer {
    /// Spawn a gateway with no downstream URLs, backed by `users`/`events`.
    pub async fn spawn(
        users: Arc<dyn UsersService>,
        events: Arc<dyn EventsService>,
    ) -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new(), users, events).await
    }

    /// Spawn a gateway with extra configuration variables.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(
        vars: HashMap<String, String>,
        users: Arc<dyn UsersService>,
        events: Arc<dyn EventsService>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = vars;
        vars.entry("BIND_ADDRESS".to_string())
            .or_insert_with(|| "127.0.0.1:0".to_string());

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let client = build_http_client(config.request_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let state = build_app_state(config.clone(), &client, users, events)
            .map_err(|e| anyhow::anyhow!("Failed to build service chain: {}", e))?;

        // Build routes using the gateway's real route builder
        let app = routes::build_routes(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            // Use into_make_service_with_connect_info to support peer address fallback
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the URL of an API route, e.g. `api_url("/check")`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.url(), api_prefix(&self.config), path)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestGatewayServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test ends.
        self._handle.abort();
    }
}
