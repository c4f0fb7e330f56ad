//! Test fixtures: user database and an in-memory catalog
//!
//! The catalog serves deterministic playlists so tests never reach the real service.

use super::constants::*;
use async_trait::async_trait;
use harmonist_server::catalog_client::{
    CatalogAlbum, CatalogArtist, CatalogClient, CatalogError, CatalogImage, CatalogTrack,
    ExternalUrls, PlaylistItem, PlaylistTracksPage,
};
use harmonist_server::mood::MoodTable;
use harmonist_server::user::{HashedPassword, SqliteUserStore, UserStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const PAGE_SIZE: usize = 100;

/// Creates a temporary user database containing TEST_USER.
pub fn create_test_db_with_users() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("user.db");

    let store = SqliteUserStore::new(&db_path)?;
    store.create_user_with_password(TEST_USER, &HashedPassword::new(TEST_PASS)?)?;

    Ok((temp_dir, db_path))
}

pub fn create_test_mood_table() -> MoodTable {
    MoodTable::from_entries([
        (MOOD_HAPPY, vec![HAPPY_PLAYLIST_1, HAPPY_PLAYLIST_2]),
        (MOOD_SAD, vec![SAD_PLAYLIST]),
        (MOOD_BROKEN, vec![BROKEN_PLAYLIST]),
    ])
    .expect("Invalid test mood table")
}

fn track_item(id: &str) -> Option<PlaylistItem> {
    Some(PlaylistItem {
        track: Some(CatalogTrack {
            id: Some(id.to_string()),
            name: Some(format!("Song {}", id)),
            artists: vec![
                Some(CatalogArtist {
                    name: Some("The Testers".to_string()),
                }),
                Some(CatalogArtist {
                    name: Some("Guest".to_string()),
                }),
            ],
            external_urls: Some(ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/track/{}", id)),
            }),
            uri: Some(format!("spotify:track:{}", id)),
            album: Some(CatalogAlbum {
                images: vec![
                    CatalogImage {
                        url: format!("https://i.example.com/{}/640", id),
                        width: Some(640),
                        height: Some(640),
                    },
                    CatalogImage {
                        url: format!("https://i.example.com/{}/300", id),
                        width: Some(300),
                        height: Some(300),
                    },
                ],
            }),
            preview_url: None,
        }),
    })
}

/// In-memory catalog. Page `n` of a playlist is reachable at `fixture://<playlist>/<n>`.
pub struct FixtureCatalog {
    playlists: HashMap<String, Vec<Option<PlaylistItem>>>,
    requests: AtomicUsize,
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        let mut playlists = HashMap::new();
        for playlist in [HAPPY_PLAYLIST_1, HAPPY_PLAYLIST_2] {
            let items = (0..HAPPY_PLAYLIST_TRACKS)
                .map(|i| track_item(&format!("{}-track-{}", playlist, i)))
                .collect();
            playlists.insert(playlist.to_string(), items);
        }

        let mut sad: Vec<_> = (0..SAD_UNIQUE_TRACKS)
            .map(|i| track_item(&format!("sad-track-{}", i)))
            .collect();
        sad.push(track_item("sad-track-0"));
        sad.push(track_item("sad-track-1"));
        playlists.insert(SAD_PLAYLIST.to_string(), sad);

        Self {
            playlists,
            requests: AtomicUsize::new(0),
        }
    }
}

impl FixtureCatalog {
    /// Number of upstream calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn page(&self, playlist_id: &str, index: usize) -> Result<PlaylistTracksPage, CatalogError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if playlist_id == BROKEN_PLAYLIST {
            return Err(CatalogError::Api {
                status: 502,
                message: BROKEN_PLAYLIST_ERROR.to_string(),
            });
        }
        let items = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| CatalogError::Api {
                status: 404,
                message: "Resource not found".to_string(),
            })?;

        let start = index * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(items.len());
        let next = (end < items.len()).then(|| format!("fixture://{}/{}", playlist_id, index + 1));
        Ok(PlaylistTracksPage {
            items: items[start.min(end)..end].to_vec(),
            next,
        })
    }
}

#[async_trait]
impl CatalogClient for FixtureCatalog {
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistTracksPage, CatalogError> {
        self.page(playlist_id, 0)
    }

    async fn next_page(&self, next_url: &str) -> Result<PlaylistTracksPage, CatalogError> {
        let (playlist_id, index) = next_url
            .strip_prefix("fixture://")
            .and_then(|rest| rest.rsplit_once('/'))
            .ok_or_else(|| CatalogError::InvalidResponse(next_url.to_string()))?;
        let index = index
            .parse()
            .map_err(|_| CatalogError::InvalidResponse(next_url.to_string()))?;
        self.page(playlist_id, index)
    }
}
