//! Mock MobSF API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the MobSF
//! REST API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server keeps uploads and scans in
//! state across requests, so a whole upload → scan → report → delete
//! workflow can run against it.
//!
//! # Example
//!
//! ```ignore
//! use mobsf_cli::mock_server::MockServer;
//! use mobsf_cli::MobsfClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = MobsfClient::new("test-key", server.url()).unwrap();
//!
//!     // Server comes with one scanned app preloaded
//!     let scans = client.list_scans().await.unwrap();
//!     assert_eq!(scans.count, 1);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, ScanProfile, StoredUpload};
