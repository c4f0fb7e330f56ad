use crate::catalog_client::CatalogTrack;
use serde::{Deserialize, Serialize};

/// A normalized track as returned to clients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub track_url: String,
    pub uri: Option<String>,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
}

impl Track {
    pub fn from_catalog(raw: &CatalogTrack) -> Self {
        let artist = raw
            .artists
            .iter()
            .filter_map(|a| a.as_ref())
            .map(|a| a.name.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ");

        // Medium resolution when available, otherwise whatever comes first.
        let image_url = raw.album.as_ref().and_then(|album| {
            album
                .images
                .get(1)
                .or_else(|| album.images.first())
                .map(|image| image.url.clone())
        });

        Self {
            id: raw.id.clone().unwrap_or_default(),
            title: raw.name.clone().unwrap_or_default(),
            artist,
            track_url: raw
                .external_urls
                .as_ref()
                .and_then(|urls| urls.spotify.clone())
                .unwrap_or_default(),
            uri: raw.uri.clone(),
            image_url,
            preview_url: raw.preview_url.clone(),
        }
    }

    pub fn is_identifiable(&self) -> bool {
        !self.id.is_empty() || !self.track_url.is_empty()
    }

    /// Key used to spot duplicates: the id, or the web link for tracks without one.
    pub fn identity_key(&self) -> &str {
        if self.id.is_empty() {
            &self.track_url
        } else {
            &self.id
        }
    }
}
