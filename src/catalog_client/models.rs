//! Raw payloads of the catalog's "tracks in playlist" API.
//!
//! The upstream service is loose about nulls: removed tracks come back as `"track": null`,
//! local files have a null `id`, and arrays are occasionally null instead of empty. Every
//! field here tolerates both absence and null.

use serde::{Deserialize, Deserializer, Serialize};

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One page of a playlist listing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlaylistTracksPage {
    #[serde(default, deserialize_with = "null_to_default")]
    pub items: Vec<Option<PlaylistItem>>,
    /// Absolute URL of the following page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<CatalogTrack>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub artists: Vec<Option<CatalogArtist>>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub album: Option<CatalogAlbum>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogAlbum {
    #[serde(default, deserialize_with = "null_to_default")]
    pub images: Vec<CatalogImage>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CatalogImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Response of the accounts service token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}
