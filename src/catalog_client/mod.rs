//! Access to the upstream music catalog's playlist listings.

mod models;
mod spotify;

pub use models::{
    CatalogAlbum, CatalogArtist, CatalogImage, CatalogTrack, ExternalUrls, PlaylistItem,
    PlaylistTracksPage,
};
pub use spotify::{
    SpotifyCatalogClient, SpotifySettings, DEFAULT_ACCOUNTS_URL, DEFAULT_API_BASE_URL,
    DEFAULT_TIMEOUT_SEC,
};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(String),

    #[error("Catalog authentication failed: {0}")]
    Auth(String),

    #[error("Catalog rate limit exceeded{}", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Catalog returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(", retry after {}s", secs),
        None => String::new(),
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::InvalidResponse(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

/// Paginated read access to a playlist's tracks.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches the first page of the playlist's tracks.
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistTracksPage, CatalogError>;

    /// Follows a `next` link returned by a previous page.
    async fn next_page(&self, next_url: &str) -> Result<PlaylistTracksPage, CatalogError>;
}
