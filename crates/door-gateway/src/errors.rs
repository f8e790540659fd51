//! Door gateway error types.
//!
//! Transport errors (encoding, status, decoding, network, retry exhaustion)
//! are kept distinct from the domain errors raised by the business service
//! so the HTTP layer can map them to different status codes. Error messages
//! returned to clients are generic; the detail is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Door gateway error type.
///
/// Maps to HTTP status codes:
/// - UnexpectedStatus, Decoding, Transport, NoEndpoints, RetryExhausted: 502 Bad Gateway
/// - ServiceUnavailable: 503 Service Unavailable
/// - Encoding, Internal: 500 Internal Server Error
/// - AuthorizationDenied: 403 Forbidden
/// - AccessDenied: 401 Unauthorized
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request encoding failed for {method}: {reason}")]
    Encoding { method: &'static str, reason: String },

    #[error("Status code incorrect for {method}. Expected: {expected} received {actual}")]
    UnexpectedStatus {
        method: &'static str,
        expected: u16,
        actual: u16,
    },

    #[error("Response decoding failed for {method}: {reason}")]
    Decoding { method: &'static str, reason: String },

    #[error("Transport error for {method}: {reason}")]
    Transport { method: &'static str, reason: String },

    #[error("No endpoints available for {0}")]
    NoEndpoints(&'static str),

    #[error("Retry budget exhausted for {method} after {attempts} attempt(s): {last}")]
    RetryExhausted {
        method: &'static str,
        attempts: u32,
        last: Box<GatewayError>,
    },

    #[error("Only admin users can update access")]
    AuthorizationDenied,

    #[error("User does not have access to {0}")]
    AccessDenied(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::UnexpectedStatus { .. }
            | GatewayError::Decoding { .. }
            | GatewayError::Transport { .. }
            | GatewayError::NoEndpoints(_)
            | GatewayError::RetryExhausted { .. } => 502,
            GatewayError::ServiceUnavailable(_) => 503,
            GatewayError::Encoding { .. } | GatewayError::Internal => 500,
            GatewayError::AuthorizationDenied => 403,
            GatewayError::AccessDenied(_) => 401,
        }
    }

    /// Whether this error originated in a downstream call rather than in
    /// the gateway's own domain logic.
    pub fn is_downstream(&self) -> bool {
        !matches!(
            self,
            GatewayError::AuthorizationDenied
                | GatewayError::AccessDenied(_)
                | GatewayError::Internal
        )
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            GatewayError::UnexpectedStatus { .. }
            | GatewayError::Decoding { .. }
            | GatewayError::Transport { .. }
            | GatewayError::NoEndpoints(_)
            | GatewayError::RetryExhausted { .. } => {
                // Log actual error server-side, return generic message to client
                tracing::warn!(target: "door.errors", error = %self, "Downstream call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "DOWNSTREAM_ERROR",
                    "An upstream service call failed".to_string(),
                )
            }
            GatewayError::ServiceUnavailable(reason) => {
                tracing::warn!(target: "door.errors", reason = %reason, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            GatewayError::Encoding { .. } | GatewayError::Internal => {
                tracing::error!(target: "door.errors", error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            GatewayError::AuthorizationDenied => {
                (StatusCode::FORBIDDEN, "ADMIN_REQUIRED", self.to_string())
            }
            GatewayError::AccessDenied(_) => {
                (StatusCode::UNAUTHORIZED, "ACCESS_DENIED", self.to_string())
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
