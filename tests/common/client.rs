//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides methods for all server endpoints.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client holding an optional bearer token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Token sent as `Authorization: Bearer` on protected endpoints
    pub token: Option<String>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client logged in as TEST_USER
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let mut client = Self::new(base_url);

        let response = client.login(TEST_USER, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Test user authentication failed"
        );
        let body: serde_json::Value = response.json().await.expect("Invalid login response");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Login response without token")
                .to_string(),
        );

        client
    }

    /// Returns a copy of this client sending the given token instead
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
        }
    }

    // ========================================================================
    // Public Endpoints
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /moods
    pub async fn moods(&self) -> Response {
        self.client
            .get(format!("{}/moods", self.base_url))
            .send()
            .await
            .expect("Moods request failed")
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /register
    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/register",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// POST /login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post_json("/login", json!({ "username": username, "password": password }))
            .await
    }

    /// POST with an arbitrary JSON body
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POST with a raw, possibly malformed, body
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// GET /get_playlist?mood=<mood>
    pub async fn get_playlist(&self, mood: &str) -> Response {
        self.get_playlist_with_query(&[("mood", mood)]).await
    }

    /// GET /get_playlist?mood=<mood>&limit=<limit>
    pub async fn get_playlist_with_limit(&self, mood: &str, limit: &str) -> Response {
        self.get_playlist_with_query(&[("mood", mood), ("limit", limit)])
            .await
    }

    pub async fn get_playlist_with_query(&self, query: &[(&str, &str)]) -> Response {
        let mut request = self
            .client
            .get(format!("{}/get_playlist", self.base_url))
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Playlist request failed")
    }
}
