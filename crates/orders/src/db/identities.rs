//! Owner lookups against the identity service's database.

use async_trait::async_trait;
use sqlx::PgPool;

use tech_commerce_core::{Role, Submitter, UserId};

use super::RepositoryError;

/// Resolves identity ids to their display details.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Look up an identity. `Ok(None)` means it does not exist (anymore).
    async fn find(&self, id: UserId) -> Result<Option<Submitter>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    first_name: String,
    last_name: String,
    email: String,
    role: Role,
}

/// Directory reading `identity.users` over its own connection pool.
#[derive(Clone)]
pub struct PgIdentityDirectory {
    pool: PgPool,
}

impl PgIdentityDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn find(&self, id: UserId) -> Result<Option<Submitter>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT first_name, last_name, email, role
            FROM identity.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Submitter::new(r.first_name, r.last_name, r.email, r.role)))
    }
}
