//! Persistence for the identity service.
//!
//! # Database
//!
//! - `identity.users` - accounts with their Argon2 password hashes
//!
//! The order service reads `identity.users` directly to resolve order owners,
//! so column names here are part of its contract too.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/identity/migrations/` and run via:
//! ```bash
//! cargo run -p tech-commerce-cli -- migrate identity
//! ```

pub mod memory;
pub mod users;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryUserStore;
pub use users::{PgUserStore, UserStore};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
