//! Persistence for the order service.
//!
//! # Databases
//!
//! - orders database (owned): `orders.orders`, `orders.order_items`
//! - identity database (read-only here): `identity.users`, consulted to
//!   resolve order owners
//!
//! Both seams are traits so the HTTP layer never sees a concrete backend:
//! [`OrderStore`] persists orders and [`IdentityDirectory`] resolves owners.
//! `Pg*` implementations back the running service, `Memory*` ones back tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/orders/migrations/` and run via:
//! ```bash
//! cargo run -p tech-commerce-cli -- migrate orders
//! ```

pub mod identities;
pub mod memory;
pub mod orders;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use identities::{IdentityDirectory, PgIdentityDirectory};
pub use memory::{MemoryIdentityDirectory, MemoryOrderStore};
pub use orders::{OrderStore, PgOrderStore};

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

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
