//! Harmonist Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_client;
pub mod config;
pub mod mood;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use catalog_client::{CatalogClient, CatalogError, SpotifyCatalogClient};
pub use mood::{MoodResolver, MoodTable, Track};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserManager, UserStore};
