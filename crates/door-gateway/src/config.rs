//! Door gateway configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! never reloaded. Downstream base URLs are optional: when a service URL is
//! absent its proxy degrades to a pass-through (see `proxy`).

use crate::proxy::ProxyConfig;
use reqwest::{Method, Url};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8090";

/// Default Prometheus scrape bind address.
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8092";

/// Default process-wide request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 200_000;

/// Default attempt budget for outbound calls.
pub const DEFAULT_OUTBOUND_MAX_ATTEMPTS: u32 = 1;

/// Default wall-clock budget for outbound calls in milliseconds.
pub const DEFAULT_OUTBOUND_MAX_TIME_MS: u64 = 500_000;

/// Door gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8090").
    pub bind_address: String,

    /// Metrics server bind address (default: "0.0.0.0:8092").
    pub metrics_bind_address: String,

    /// Service name, attached to every metric as a constant label.
    pub service_name: String,

    /// Route prefix (default: "dooraccess").
    pub base_path: String,

    /// API version segment (default: "v1").
    pub version: String,

    /// Deployment data set ("test", "qa", ...).
    pub data_type: String,

    /// Process-wide deadline for one inbound request.
    pub request_timeout: Duration,

    /// Users service base URL (e.g., "http://users:8080").
    pub users_url: Option<Url>,

    /// Events service base URL.
    pub events_url: Option<Url>,

    /// Users service path for identity lookup.
    pub users_get_user_path: String,

    /// Users service path for door authentication.
    pub users_authenticate_path: String,

    /// Users service path for access-grant updates.
    pub users_update_access_path: String,

    /// Events service path for history lookup.
    pub events_get_path: String,

    /// Events service path for recording an event.
    pub events_update_path: String,

    /// Attempt budget per outbound call.
    pub outbound_max_attempts: u32,

    /// Wall-clock budget per outbound call.
    pub outbound_max_time: Duration,

    /// Graceful shutdown drain period.
    pub drain_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL configuration: {0}")]
    InvalidUrl(String),

    #[error("Invalid request timeout configuration: {0}")]
    InvalidRequestTimeout(String),

    #[error("Invalid outbound retry configuration: {0}")]
    InvalidRetry(String),

    #[error("Invalid drain configuration: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let string_or = |key: &str, default: &str| {
            vars.get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let request_timeout_ms =
            parse_positive(vars, "REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)
                .map_err(ConfigError::InvalidRequestTimeout)?;

        let outbound_max_attempts = parse_positive(
            vars,
            "OUTBOUND_MAX_ATTEMPTS",
            u64::from(DEFAULT_OUTBOUND_MAX_ATTEMPTS),
        )
        .and_then(|value| {
            u32::try_from(value)
                .map_err(|_| format!("OUTBOUND_MAX_ATTEMPTS must fit in 32 bits, got {}", value))
        })
        .map_err(ConfigError::InvalidRetry)?;

        let outbound_max_time_ms =
            parse_positive(vars, "OUTBOUND_MAX_TIME_MS", DEFAULT_OUTBOUND_MAX_TIME_MS)
                .map_err(ConfigError::InvalidRetry)?;

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidDrain(format!(
                    "DRAIN_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        Ok(Config {
            bind_address: string_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            metrics_bind_address: string_or("METRICS_BIND_ADDRESS", DEFAULT_METRICS_BIND_ADDRESS),
            service_name: string_or("SERVICE_NAME", "dooraccess"),
            base_path: string_or("SERVICE_BASE_PATH", "dooraccess"),
            version: string_or("SERVICE_VERSION", "v1"),
            data_type: string_or("SERVICE_DATA_TYPE", "test"),
            request_timeout: Duration::from_millis(request_timeout_ms),
            users_url: parse_base_url(vars, "USERS_SERVICE_URL")?,
            events_url: parse_base_url(vars, "EVENTS_SERVICE_URL")?,
            users_get_user_path: string_or("USERS_GET_USER_PATH", "/users/v1/getuser"),
            users_authenticate_path: string_or("USERS_AUTHENTICATE_PATH", "/users/v1/authenticate"),
            users_update_access_path: string_or(
                "USERS_UPDATE_ACCESS_PATH",
                "/users/v1/updateuseraccess",
            ),
            events_get_path: string_or("EVENTS_GET_PATH", "/events/v1/getevents"),
            events_update_path: string_or("EVENTS_UPDATE_PATH", "/events/v1/updateevent"),
            outbound_max_attempts,
            outbound_max_time: Duration::from_millis(outbound_max_time_ms),
            drain_seconds,
        })
    }

    /// Proxy configuration for the users service identity lookup.
    pub fn get_user_proxy(&self) -> Result<ProxyConfig, ConfigError> {
        self.proxy_config(self.users_url.as_ref(), &self.users_get_user_path, Method::GET)
    }

    /// Proxy configuration for the users service door authentication.
    pub fn door_authenticate_proxy(&self) -> Result<ProxyConfig, ConfigError> {
        self.proxy_config(
            self.users_url.as_ref(),
            &self.users_authenticate_path,
            Method::POST,
        )
    }

    /// Proxy configuration for the users service access-grant update.
    pub fn update_access_proxy(&self) -> Result<ProxyConfig, ConfigError> {
        self.proxy_config(
            self.users_url.as_ref(),
            &self.users_update_access_path,
            Method::POST,
        )
    }

    /// Proxy configuration for the events service history lookup.
    pub fn get_events_proxy(&self) -> Result<ProxyConfig, ConfigError> {
        self.proxy_config(self.events_url.as_ref(), &self.events_get_path, Method::GET)
    }

    /// Proxy configuration for the events service event recording.
    pub fn update_events_proxy(&self) -> Result<ProxyConfig, ConfigError> {
        self.proxy_config(
            self.events_url.as_ref(),
            &self.events_update_path,
            Method::POST,
        )
    }

    fn proxy_config(
        &self,
        base: Option<&Url>,
        path: &str,
        method: Method,
    ) -> Result<ProxyConfig, ConfigError> {
        let url = base.map(|base| join_path(base, path)).transpose()?;

        Ok(ProxyConfig {
            url,
            method,
            max_attempts: self.outbound_max_attempts,
            max_time: self.outbound_max_time,
        })
    }
}

/// Appends `path` to `base`, keeping any path prefix already on the base.
fn join_path(base: &Url, path: &str) -> Result<Url, ConfigError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| {
        ConfigError::InvalidUrl(format!("cannot join '{}' onto '{}': {}", path, base, e))
    })
}

fn parse_positive(vars: &HashMap<String, String>, key: &str, default: u64) -> Result<u64, String> {
    let Some(value_str) = vars.get(key) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        format!(
            "{} must be a valid positive integer, got '{}': {}",
            key, value_str, e
        )
    })?;

    if value == 0 {
        return Err(format!("{} must be greater than 0", key));
    }

    Ok(value)
}

fn parse_base_url(vars: &HashMap<String, String>, key: &str) -> Result<Option<Url>, ConfigError> {
    match vars.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(value) => {
            let url = Url::parse(value).map_err(|e| {
                ConfigError::InvalidUrl(format!(
                    "{} must be an absolute URL, got '{}': {}",
                    key, value, e
                ))
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(format!(
                    "{} must use http or https, got '{}'",
                    key, value
                )));
            }

            Ok(Some(url))
        }
        None => Ok(None),
    }
}
