use super::RequestsLoggingLevel;
use crate::mood::DEFAULT_TRACK_LIMIT;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub host: String,
    pub port: u16,
    /// Number of tracks returned by /get_playlist when the request has no `limit`.
    pub default_track_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_track_limit: DEFAULT_TRACK_LIMIT,
        }
    }
}
