//! # Gateway Test Utilities
//!
//! Shared test utilities for the door gateway.
//!
//! This crate provides:
//! - Server test harness (`TestGatewayServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_test_utils::*;
//! use door_gateway::services::{MockEventsService, MockUsersService};
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestGatewayServer::spawn(
//!         Arc::new(MockUsersService::new()),
//!         Arc::new(MockEventsService::new()),
//!     )
//!     .await?;
//!
//!     let response = reqwest::get(server.api_url("/check")).await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
