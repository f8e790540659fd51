//! Door authentication handler.

use crate::errors::GatewayError;
use crate::models::DoorAuthenticateResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use common::types::DoorAuthenticateRequest;
use common::RequestContext;
use std::sync::Arc;

/// Handler for POST /doorauthenticate
///
/// Denied attempts surface as `GatewayError::AccessDenied` (401).
#[tracing::instrument(skip_all, name = "door.doors.authenticate")]
pub async fn door_authenticate(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<DoorAuthenticateRequest>,
) -> Result<Json<DoorAuthenticateResponse>, GatewayError> {
    let has_access = state.service.door_authenticate(&ctx, &request).await?;
    Ok(Json(DoorAuthenticateResponse { has_access }))
}
