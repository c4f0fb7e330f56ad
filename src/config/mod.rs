mod file_config;

pub use file_config::{FileConfig, SpotifyConfig};

use crate::catalog_client::SpotifySettings;
use crate::mood::{MoodTable, DEFAULT_FETCH_CAP, DEFAULT_TRACK_LIMIT};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_SECRET_KEY: &str = "harmonist_secret_key";
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub logging_level: RequestsLoggingLevel,
    pub secret_key: Option<String>,
    pub token_ttl_hours: u64,
    pub fetch_cap: usize,
    pub default_track_limit: usize,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_refresh_token: Option<String>,
    pub spotify_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            db_path: PathBuf::from("user.db"),
            logging_level: RequestsLoggingLevel::Path,
            secret_key: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            fetch_cap: DEFAULT_FETCH_CAP,
            default_track_limit: DEFAULT_TRACK_LIMIT,
            spotify_client_id: None,
            spotify_client_secret: None,
            spotify_refresh_token: None,
            spotify_timeout_sec: crate::catalog_client::DEFAULT_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub logging_level: RequestsLoggingLevel,
    pub secret_key: String,
    pub token_ttl_hours: u64,
    pub fetch_cap: usize,
    pub default_track_limit: usize,
    pub spotify: SpotifySettings,
    pub mood_table: MoodTable,
}

/// Treats blank strings as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let host = non_blank(file.host).unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let logging_level = match file.logging_level {
            Some(s) => parse_logging_level(&s)
                .ok_or_else(|| anyhow!("Invalid logging_level in config file: {}", s))?,
            None => cli.logging_level.clone(),
        };

        let secret_key = match non_blank(file.secret_key).or_else(|| non_blank(cli.secret_key.clone())) {
            Some(secret) => secret,
            None => {
                warn!("No secret key configured, signing session tokens with the built-in default");
                DEFAULT_SECRET_KEY.to_string()
            }
        };

        let token_ttl_hours = file.token_ttl_hours.unwrap_or(cli.token_ttl_hours);
        if token_ttl_hours == 0 {
            bail!("token_ttl_hours must be greater than zero");
        }
        let fetch_cap = file.fetch_cap.unwrap_or(cli.fetch_cap);
        if fetch_cap == 0 {
            bail!("fetch_cap must be greater than zero");
        }
        let default_track_limit = file.default_track_limit.unwrap_or(cli.default_track_limit);
        if default_track_limit == 0 {
            bail!("default_track_limit must be greater than zero");
        }

        let spotify_file = file.spotify.unwrap_or_default();
        let client_id = non_blank(spotify_file.client_id)
            .or_else(|| non_blank(cli.spotify_client_id.clone()))
            .ok_or_else(|| {
                anyhow!("Spotify client id must be specified via --spotify-client-id, SPOTIFY_CLIENT_ID or in config file")
            })?;
        let client_secret = non_blank(spotify_file.client_secret)
            .or_else(|| non_blank(cli.spotify_client_secret.clone()))
            .ok_or_else(|| {
                anyhow!("Spotify client secret must be specified via --spotify-client-secret, SPOTIFY_CLIENT_SECRET or in config file")
            })?;

        let mut spotify = SpotifySettings::new(client_id, client_secret);
        spotify.refresh_token = non_blank(spotify_file.refresh_token)
            .or_else(|| non_blank(cli.spotify_refresh_token.clone()));
        if let Some(url) = non_blank(spotify_file.accounts_url) {
            spotify.accounts_url = url;
        }
        if let Some(url) = non_blank(spotify_file.api_base_url) {
            spotify.api_base_url = url;
        }
        spotify.timeout_sec = spotify_file.timeout_sec.unwrap_or(cli.spotify_timeout_sec);

        let mood_table = match file.moods {
            Some(moods) => MoodTable::from_entries(moods).context("Invalid [moods] table")?,
            None => MoodTable::default(),
        };

        Ok(Self {
            host,
            port,
            db_path,
            logging_level,
            secret_key,
            token_ttl_hours,
            fetch_cap,
            default_track_limit,
            spotify,
            mood_table,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            default_track_limit: self.default_track_limit,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours as i64)
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
