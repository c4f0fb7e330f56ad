//! Spotify Web API implementation of [`CatalogClient`].

use super::models::{AccessTokenResponse, PlaylistTracksPage};
use super::{CatalogClient, CatalogError};
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

const PAGE_SIZE: usize = 100;
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    /// When present the refresh token grant is used, which also reaches private playlists.
    pub refresh_token: Option<String>,
    pub accounts_url: String,
    pub api_base_url: String,
    pub timeout_sec: u64,
}

impl SpotifySettings {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: None,
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct SpotifyCatalogClient {
    client: reqwest::Client,
    settings: SpotifySettings,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalogClient {
    pub fn new(mut settings: SpotifySettings) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_sec))
            .build()
            .map_err(|e| CatalogError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        settings.api_base_url = settings.api_base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            settings,
            token: Mutex::new(None),
        })
    }

    fn first_page_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks?limit={}",
            self.settings.api_base_url,
            urlencoding::encode(playlist_id),
            PAGE_SIZE
        )
    }

    /// Returns a usable access token, requesting a new one when the cached one is about to expire.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken, CatalogError> {
        let form: Vec<(&str, &str)> = match self.settings.refresh_token.as_deref() {
            Some(refresh_token) => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            None => vec![("grant_type", "client_credentials")],
        };
        debug!(
            "Requesting catalog access token with grant {}",
            form[0].1
        );

        let response = self
            .client
            .post(&self.settings.accounts_url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<TokenErrorBody>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(CatalogError::Auth(reason));
        }

        let token: AccessTokenResponse = response.json().await?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    async fn get_page(&self, url: &str) -> Result<PlaylistTracksPage, CatalogError> {
        let access_token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Catalog rejected the access token, dropping it");
                *self.token.lock().await = None;
                let message = error_message(response.text().await.unwrap_or_default(), status);
                Err(CatalogError::Auth(message))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok());
                Err(CatalogError::RateLimited { retry_after })
            }
            _ => Err(CatalogError::Api {
                status: status.as_u16(),
                message: error_message(response.text().await.unwrap_or_default(), status),
            }),
        }
    }
}

/// Extracts the message of a Web API error body, falling back to the status reason.
fn error_message(body: String, status: StatusCode) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

#[async_trait]
impl CatalogClient for SpotifyCatalogClient {
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistTracksPage, CatalogError> {
        let url = self.first_page_url(playlist_id);
        debug!("Fetching playlist {}", playlist_id);
        self.get_page(&url).await
    }

    async fn next_page(&self, next_url: &str) -> Result<PlaylistTracksPage, CatalogError> {
        self.get_page(next_url).await
    }
}
