//! Users and events service data types.
//!
//! These mirror the JSON bodies exchanged with the downstream services and
//! are treated as immutable values for the lifetime of one call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity record owned by the users service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: String,

    /// Login name.
    pub username: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Whether the user may edit access grants.
    #[serde(default)]
    pub is_admin: bool,

    /// Door name to access grant.
    #[serde(default)]
    pub door_access: BTreeMap<String, bool>,
}

/// Door authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorAuthenticateRequest {
    /// User attempting to open the door.
    pub username: String,

    /// Door being opened.
    pub access_door: String,
}

/// Access grant change. Only honored when the acting user is an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccessRequest {
    /// Acting user.
    pub username: String,

    /// Door whose grant is changed.
    pub access_door: String,

    /// Desired grant.
    pub has_access: bool,
}

/// A single access occurrence: door name to Unix timestamp (seconds).
pub type Event = BTreeMap<String, i64>;

/// Recorded access events for one user, in recording order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events {
    /// Owner of the events.
    #[serde(default)]
    pub username: String,

    /// Events in insertion order. Absent or `null` decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<Event>,
}

impl Events {
    /// Total number of door/time pairs across all events.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.events.iter().map(BTreeMap::len).sum()
    }
}

/// Request to append one event to a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    /// Owner of the event.
    pub username: String,

    /// Door name to Unix timestamp (seconds).
    pub event: Event,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Event>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Event>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_events_null_decodes_as_empty() {
        let events: Events = serde_json::from_str(r#"{"username":"abc","events":null}"#).unwrap();
        assert!(events.events.is_empty());

        let events: Events = serde_json::from_str(r#"{"username":"abc"}"#).unwrap();
        assert!(events.events.is_empty());
    }

    #[test]
    fn test_entry_count_flattens_events() {
        let events = Events {
            username: "abc".to_string(),
            events: vec![
                BTreeMap::from([("Door1".to_string(), 1), ("Door2".to_string(), 2)]),
                BTreeMap::from([("Door1".to_string(), 3)]),
                BTreeMap::new(),
            ],
        };

        assert_eq!(events.entry_count(), 3);
    }

    #[test]
    fn test_user_decodes_without_optional_fields() {
        let json = r#"{"id":"1","username":"abc","first_name":"a","last_name":"c"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert!(!user.is_admin);
        assert!(user.door_access.is_empty());
    }

    #[test]
    fn test_update_access_request_serialization() {
        let request = UpdateAccessRequest {
            username: "admin".to_string(),
            access_door: "Door1".to_string(),
            has_access: true,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(json.contains("\"access_door\":\"Door1\""));
        assert!(json.contains("\"has_access\":true"));
    }
}
