//! Flattens a user's access events into display-ready entries.

use crate::models::{FormattedEvent, UserResponse};
use chrono::{TimeZone, Utc};
use common::types::{Events, User};

/// Display format for event timestamps, always rendered in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Combine a user record and its events into a `UserResponse`.
///
/// Each door/time pair becomes one output entry. Events keep their input
/// order; doors within one event are emitted in name order.
pub fn format_events(user: User, events: &Events) -> UserResponse {
    let mut formatted = Vec::with_capacity(events.entry_count());

    for event in &events.events {
        for (door, seconds) in event {
            let mut entry = FormattedEvent::new();
            entry.insert(door.clone(), format_timestamp(*seconds));
            formatted.push(entry);
        }
    }

    UserResponse {
        user_info: user,
        events: formatted,
    }
}

/// Render Unix seconds as `YYYY-MM-DD HH:MM:SS +0000 UTC`.
///
/// Seconds outside chrono's range are rendered as the raw integer.
pub fn format_timestamp(seconds: i64) -> String {
    match Utc.timestamp_opt(seconds, 0).single() {
        Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}
