use super::auth::{HashedPassword, UsernamePasswordCredentials};
use anyhow::Result;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the user's password credentials given the user handle.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_credentials(
        &self,
        user_handle: &str,
    ) -> Result<Option<UsernamePasswordCredentials>>;

    /// Stamps the credentials' last_tried time, and last_used when the attempt succeeded.
    fn record_password_attempt(&self, user_id: usize, succeeded: bool) -> Result<()>;
}

pub trait UserStore: UserAuthCredentialsStore + Send + Sync {
    /// Creates a user together with its password credentials, atomically.
    /// Returns Ok(None) if the handle is already taken.
    fn create_user_with_password(
        &self,
        user_handle: &str,
        password: &HashedPassword,
    ) -> Result<Option<usize>>;

    /// Returns a user's id given the user handle.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;
}
