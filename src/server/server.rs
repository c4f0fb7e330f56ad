use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use super::session::{Session, SessionExtractionError};
use super::{log_requests, state::*, ApiError, ServerConfig};

const MISSING_MOOD_MESSAGE: &str = "Mood parameter is required";
const INVALID_LIMIT_MESSAGE: &str = "Limit must be a positive integer";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
struct CredentialsBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsBody {
    /// Missing or malformed bodies behave like blank credentials.
    fn parse(body: &Bytes) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    message: &'static str,
    user_id: usize,
    token: String,
}

#[derive(Deserialize, Debug, Default)]
struct PlaylistQuery {
    pub mood: Option<String>,
    pub limit: Option<String>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
    };
    Json(stats)
}

async fn get_moods(State(mood_resolver): State<GuardedMoodResolver>) -> impl IntoResponse {
    let moods: Vec<String> = mood_resolver
        .mood_table()
        .moods()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(moods)
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body = CredentialsBody::parse(&body);
    user_manager.register(&body.username, &body.password)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully." })),
    )
        .into_response())
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    body: Bytes,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    let body = CredentialsBody::parse(&body);
    let outcome = user_manager.login(&body.username, &body.password)?;
    debug!("User {} logged in", outcome.user_id);

    Ok(Json(LoginSuccessResponse {
        message: "Login successful.",
        user_id: outcome.user_id,
        token: outcome.token,
    }))
}

fn parse_limit(raw: Option<&str>, default_limit: usize) -> Result<usize, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default_limit),
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(ApiError::bad_request(INVALID_LIMIT_MESSAGE)),
        },
    }
}

/// Query validation runs before the session check, so a blank mood is a 400 whatever the token.
async fn get_playlist(
    State(state): State<ServerState>,
    query: Result<Query<PlaylistQuery>, QueryRejection>,
    session: Result<Session, SessionExtractionError>,
) -> Result<Response, Response> {
    let Query(query) = query.map_err(|err| {
        debug!("Rejected playlist query: {}", err);
        ApiError::bad_request(MISSING_MOOD_MESSAGE).into_response()
    })?;

    let mood = query.mood.as_deref().map(str::trim).unwrap_or_default();
    if mood.is_empty() {
        return Err(ApiError::bad_request(MISSING_MOOD_MESSAGE).into_response());
    }
    let limit = parse_limit(query.limit.as_deref(), state.config.default_track_limit)
        .map_err(IntoResponse::into_response)?;

    let session = session.map_err(IntoResponse::into_response)?;
    debug!("user_id={} requested mood {:?}", session.user_id, mood);

    let tracks = state
        .mood_resolver
        .resolve(mood, limit)
        .await
        .map_err(|err| ApiError::from(err).into_response())?;

    Ok(Json(tracks).into_response())
}

pub fn make_app(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    mood_resolver: GuardedMoodResolver,
) -> Router {
    let state = ServerState::new(config, user_manager, mood_resolver);

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state.clone());

    let playlist_routes: Router = Router::new()
        .route("/moods", get(get_moods))
        .route("/get_playlist", get(get_playlist))
        .with_state(state.clone());

    Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .merge(auth_routes)
        .merge(playlist_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
        .layer(CorsLayer::permissive())
}

pub async fn run_server(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    mood_resolver: GuardedMoodResolver,
) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let app = make_app(config, user_manager, mood_resolver);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await?;
    Ok(())
}
