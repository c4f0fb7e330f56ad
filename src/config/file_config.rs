use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_path: Option<String>,
    pub logging_level: Option<String>,
    pub secret_key: Option<String>,
    pub token_ttl_hours: Option<u64>,
    pub fetch_cap: Option<usize>,
    pub default_track_limit: Option<usize>,

    pub spotify: Option<SpotifyConfig>,
    /// Replaces the built-in mood table when present.
    pub moods: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub accounts_url: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
