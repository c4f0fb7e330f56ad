//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, MOOD_HAPPY};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_playlist() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone()).await;
//!
//!     let response = client.get_playlist(MOOD_HAPPY).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

// Each test binary only uses part of this module.
#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;

#[allow(unused_imports)]
pub use fixtures::FixtureCatalog;
