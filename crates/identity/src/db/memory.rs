//! In-process account store backing the router tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tech_commerce_core::{Email, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    /// Accounts with their password hashes, in insertion (= id) order.
    users: RwLock<Vec<(User, String)>>,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store switched off".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.check_available()?;

        let mut users = self.users.write().await;
        if users.iter().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = i32::try_from(users.len() + 1)
            .map_err(|_| RepositoryError::Unavailable("id space exhausted".to_owned()))?;
        let now = Utc::now();
        let created = User {
            id: UserId::new(id),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push((created.clone(), user.password_hash));
        Ok(created)
    }

    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        self.check_available()?;

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.check_available()?;

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        self.check_available()?;

        Ok(self.users.read().await.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}
