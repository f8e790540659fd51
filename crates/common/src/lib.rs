//! Contract types shared between the door-access gateway and the
//! downstream users/events services it consumes.

#![warn(clippy::pedantic)]

/// Module for the per-call request context
pub mod context;

/// Module for users/events contract data types
pub mod types;

pub use context::RequestContext;
