//! User handlers.
//!
//! - `GET /getuser?username=` - identity plus formatted access history
//! - `POST /updateuseraccess` - change a door grant (admin only)

use crate::errors::GatewayError;
use crate::models::{GetUserQuery, UpdateAccessResponse, UserResponse};
use crate::routes::AppState;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use common::types::UpdateAccessRequest;
use common::RequestContext;
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /getuser
#[instrument(skip_all, name = "door.users.get_user")]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<GetUserQuery>,
) -> Result<Json<UserResponse>, GatewayError> {
    let response = state.service.get_user(&ctx, &query.username).await?;
    Ok(Json(response))
}

/// Handler for POST /updateuseraccess
///
/// The acting user is `request.username`; its admin flag is re-read from
/// the users service before the change is forwarded.
#[instrument(skip_all, name = "door.users.update_access")]
pub async fn update_user_access(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<UpdateAccessRequest>,
) -> Result<Json<UpdateAccessResponse>, GatewayError> {
    state.service.update_user_access(&ctx, &request).await?;
    Ok(Json(UpdateAccessResponse { updated: true }))
}
