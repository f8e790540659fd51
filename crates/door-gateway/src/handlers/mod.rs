//! HTTP request handlers for the door gateway.

pub mod doors;
pub mod health;
pub mod metrics;
pub mod users;

pub use doors::door_authenticate;
pub use health::check;
pub use metrics::metrics_handler;
pub use users::{get_user, update_user_access};
