use super::state::ServerState;
use super::ApiError;
use crate::user::AuthError;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::IntoResponse,
};
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

#[derive(Debug)]
pub enum SessionExtractionError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            SessionExtractionError::MissingToken => AuthError::MissingToken,
            SessionExtractionError::InvalidToken => AuthError::InvalidToken,
        };
        ApiError::from(err).into_response()
    }
}

/// Reads `Authorization: Bearer <token>`. Returns `Ok(None)` when the header is absent.
fn extract_bearer_token(parts: &Parts) -> Result<Option<String>, SessionExtractionError> {
    let value = match parts.headers.get(header::AUTHORIZATION) {
        None => return Ok(None),
        Some(v) => v,
    };
    let value = value
        .to_str()
        .map_err(|_| SessionExtractionError::InvalidToken)?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(SessionExtractionError::InvalidToken),
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_bearer_token(parts)? {
            Some(token) => token,
            None => {
                debug!("No session token in headers.");
                return Err(SessionExtractionError::MissingToken);
            }
        };

        let claims = ctx
            .user_manager
            .verify_token(&token)
            .map_err(|_| SessionExtractionError::InvalidToken)?;
        debug!("Authenticated user_id={}", claims.user_id);

        Ok(Session {
            user_id: claims.user_id,
        })
    }
}
