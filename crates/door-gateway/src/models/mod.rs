//! Inbound request and response models for the door gateway.

use common::types::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One formatted access event: door name to display timestamp.
pub type FormattedEvent = BTreeMap<String, String>;

/// Identity plus formatted access history, returned by `GET /getuser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User record as returned by the users service.
    #[serde(rename = "userinfo")]
    pub user_info: User,

    /// One entry per door/time pair, never absent.
    pub events: Vec<FormattedEvent>,
}

/// Response body for `GET /check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `true` while the process is serving.
    pub healthy: bool,
}

/// Query parameters for `GET /getuser`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetUserQuery {
    #[serde(default)]
    pub username: String,
}

/// Response body for `POST /doorauthenticate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorAuthenticateResponse {
    /// Whether the door may be opened.
    pub has_access: bool,
}

/// Response body for `POST /updateuseraccess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAccessResponse {
    /// Whether the grant change was forwarded to the users service.
    pub updated: bool,
}
