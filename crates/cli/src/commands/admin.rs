//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! tc-cli admin create -e admin@tech.com -p 'a long passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `IDENTITY_DATABASE_URL` - `PostgreSQL` connection string for identities
//!   (falls back to `DATABASE_URL`)

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use tech_commerce_core::{Email, EmailError, Role, UserId};
use tech_commerce_identity::db::{PgUserStore, RepositoryError, UserStore};
use tech_commerce_identity::models::NewUser;
use tech_commerce_identity::services::AuthError;
use tech_commerce_identity::services::auth::{hash_password, validate_password};

use super::migrate::{MigrationError, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] MigrationError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create an admin account.
///
/// Idempotent: if the email is already registered nothing changes and
/// `Ok(None)` is returned.
///
/// # Returns
///
/// The ID of the created admin, if one was created.
pub async fn create_user(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Option<UserId>, AdminError> {
    let email = Email::parse(email)?;
    validate_password(password)?;

    let database_url = database_url("IDENTITY_DATABASE_URL")?;

    tracing::info!("Connecting to identity database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    let store = PgUserStore::new(pool);

    tracing::info!("Creating admin account: {}", email);

    let created = store
        .create(NewUser {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.clone(),
            password_hash: hash_password(password)?,
            role: Role::Admin,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(
                "Admin account created successfully! ID: {}, Email: {}",
                user.id,
                user.email
            );
            Ok(Some(user.id))
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!("Account already exists for {}, nothing to do", email);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
