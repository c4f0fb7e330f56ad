pub mod auth;
pub mod session_token;
mod sqlite_user_store;
mod user_manager;
mod user_store;

pub use auth::{HarmonistHasher, HashedPassword, UsernamePasswordCredentials};
pub use session_token::{SessionClaims, SessionTokenIssuer};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::{AuthError, LoginOutcome, UserManager};
pub use user_store::{UserAuthCredentialsStore, UserStore};
