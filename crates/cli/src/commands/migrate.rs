//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! tc-cli migrate orders
//! tc-cli migrate identity
//! tc-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `ORDERS_DATABASE_URL` - `PostgreSQL` connection string for orders
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string for identities
//!
//! Both fall back to `DATABASE_URL`, so a single database holding both
//! schemas works too.
//!
//! # Migration Files
//!
//! Orders migrations: `crates/orders/migrations/`
//! Identity migrations: `crates/identity/migrations/`
//!
//! Migrations are embedded at compile time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use thiserror::Error;

/// Both services may share one database and thus one `_sqlx_migrations`
/// table, so each migrator must tolerate the other's applied versions.
fn orders_migrator() -> Migrator {
    let mut migrator = sqlx::migrate!("../orders/migrations");
    migrator.set_ignore_missing(true);
    migrator
}

fn identity_migrator() -> Migrator {
    let mut migrator = sqlx::migrate!("../identity/migrations");
    migrator.set_ignore_missing(true);
    migrator
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Read `key`, falling back to `DATABASE_URL`.
pub fn database_url(key: &'static str) -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(key))
}

async fn run(name: &str, key: &'static str, migrator: Migrator) -> Result<(), MigrationError> {
    let database_url = database_url(key)?;

    tracing::info!("Connecting to {name} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running {name} migrations...");
    migrator.run(&pool).await?;

    tracing::info!("{name} migrations complete!");
    Ok(())
}

/// Run order service database migrations.
pub async fn orders() -> Result<(), MigrationError> {
    run("orders", "ORDERS_DATABASE_URL", orders_migrator()).await
}

/// Run identity service database migrations.
pub async fn identity() -> Result<(), MigrationError> {
    run("identity", "IDENTITY_DATABASE_URL", identity_migrator()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        assert!(orders_migrator().iter().next().is_some());
        assert!(identity_migrator().iter().next().is_some());
    }
}
