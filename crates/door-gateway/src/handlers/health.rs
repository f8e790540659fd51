//! Liveness handler.
//!
//! `GET /check` runs through the full service chain, so a successful probe
//! also shows up in the service metrics.

use crate::errors::GatewayError;
use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use common::RequestContext;
use std::sync::Arc;

/// Handler for GET /check
#[tracing::instrument(skip_all, name = "door.health.check")]
pub async fn check(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<HealthResponse>, GatewayError> {
    let healthy = state.service.check(&ctx).await?;
    Ok(Json(HealthResponse { healthy }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_string(&HealthResponse { healthy: true }).unwrap();
        assert_eq!(json, r#"{"healthy":true}"#);
    }
}
