use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harmonist_server::catalog_client::{CatalogClient, SpotifyCatalogClient, DEFAULT_TIMEOUT_SEC};
use harmonist_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_TOKEN_TTL_HOURS};
use harmonist_server::mood::{MoodResolver, DEFAULT_FETCH_CAP, DEFAULT_TRACK_LIMIT};
use harmonist_server::server::{run_server, RequestsLoggingLevel};
use harmonist_server::user::{SessionTokenIssuer, SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Mood based playlist backend")]
struct CliArgs {
    /// Path to the SQLite database file to use for user storage.
    #[clap(long, value_parser = parse_path, default_value = "user.db")]
    pub db_path: PathBuf,

    /// Path to a TOML config file. Its values override command line values.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Secret used to sign session tokens.
    #[clap(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Lifetime of session tokens, in hours.
    #[clap(long, default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
    pub token_ttl_hours: u64,

    /// Stop paginating a playlist once this many entries were fetched.
    #[clap(long, default_value_t = DEFAULT_FETCH_CAP)]
    pub fetch_cap: usize,

    /// Number of tracks returned when a request does not specify a limit.
    #[clap(long, default_value_t = DEFAULT_TRACK_LIMIT)]
    pub default_track_limit: usize,

    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Refresh token of a user account, gives access to private playlists.
    #[clap(long, env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub spotify_refresh_token: Option<String>,

    /// Timeout in seconds for catalog requests.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SEC)]
    pub spotify_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            host: self.host.clone(),
            port: self.port,
            db_path: self.db_path.clone(),
            logging_level: self.logging_level.clone(),
            secret_key: self.secret_key.clone(),
            token_ttl_hours: self.token_ttl_hours,
            fetch_cap: self.fetch_cap,
            default_track_limit: self.default_track_limit,
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: self.spotify_client_secret.clone(),
            spotify_refresh_token: self.spotify_refresh_token.clone(),
            spotify_timeout_sec: self.spotify_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets usually live in a .env file next to the binary.
    dotenv::dotenv().ok();
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite user database at {:?}...", config.db_path);
    let user_store = Arc::new(SqliteUserStore::new(&config.db_path)?);
    let user_manager = Arc::new(UserManager::new(
        user_store,
        SessionTokenIssuer::new(&config.secret_key, config.token_ttl()),
    ));

    let catalog: Arc<dyn CatalogClient> = Arc::new(
        SpotifyCatalogClient::new(config.spotify.clone())
            .context("Failed to create catalog client")?,
    );
    info!(
        "Catalog client ready ({} grant)",
        if config.spotify.refresh_token.is_some() {
            "refresh token"
        } else {
            "client credentials"
        }
    );

    info!("Serving {} moods", config.mood_table.len());
    let mood_resolver = Arc::new(
        MoodResolver::new(Arc::new(config.mood_table.clone()), catalog)
            .with_fetch_cap(config.fetch_cap),
    );

    run_server(config.server_config(), user_manager, mood_resolver).await
}
