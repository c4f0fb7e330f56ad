use super::{
    auth::HashedPassword,
    session_token::{SessionClaims, SessionTokenIssuer},
    UserStore,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required.")]
    MissingCredentials,

    #[error("Username is already taken.")]
    UsernameTaken,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Token is missing!")]
    MissingToken,

    #[error("Token is invalid!")]
    InvalidToken,

    #[error("DB error: {0:#}")]
    Storage(anyhow::Error),

    #[error("{0:#}")]
    Internal(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: usize,
    pub token: String,
}

pub struct UserManager {
    user_store: Arc<dyn UserStore>,
    token_issuer: SessionTokenIssuer,
}

/// Trims both fields and rejects the pair if either ends up empty.
fn normalize_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), AuthError> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok((username, password))
}

impl UserManager {
    pub fn new(user_store: Arc<dyn UserStore>, token_issuer: SessionTokenIssuer) -> Self {
        Self {
            user_store,
            token_issuer,
        }
    }

    pub fn register(&self, username: &str, password: &str) -> Result<usize, AuthError> {
        let (username, password) = normalize_credentials(username, password)?;

        if self
            .user_store
            .get_user_id(username)
            .map_err(AuthError::Storage)?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        let hashed = HashedPassword::new(password).map_err(AuthError::Internal)?;
        match self
            .user_store
            .create_user_with_password(username, &hashed)
            .map_err(AuthError::Storage)?
        {
            Some(user_id) => {
                info!("Registered user {} with id {}", username, user_id);
                Ok(user_id)
            }
            None => Err(AuthError::UsernameTaken),
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let (username, password) = normalize_credentials(username, password)?;

        let credentials = match self
            .user_store
            .get_user_auth_credentials(username)
            .map_err(AuthError::Storage)?
        {
            Some(credentials) => credentials,
            None => {
                debug!("Login attempt for unknown user {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let verified = credentials
            .password
            .verify(password)
            .map_err(AuthError::Internal)?;

        if let Err(e) = self
            .user_store
            .record_password_attempt(credentials.user_id, verified)
        {
            // Not critical for authentication.
            warn!(
                "Failed to record password attempt for user_id={}: {}",
                credentials.user_id, e
            );
        }

        if !verified {
            debug!("Wrong password for user_id={}", credentials.user_id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .token_issuer
            .issue(credentials.user_id)
            .map_err(AuthError::Internal)?;

        Ok(LoginOutcome {
            user_id: credentials.user_id,
            token,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.token_issuer.verify(token).map_err(|err| {
            debug!("Rejected session token: {}", err);
            AuthError::InvalidToken
        })
    }
}
