//! Authentication service.
//!
//! Registers accounts with Argon2id password hashes and exchanges email and
//! password for a signed bearer credential.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Duration;
use serde::Deserialize;

use tech_commerce_core::{Email, Role, TokenKeys, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id hash with the default cost parameters that matches no password.
///
/// Verified on sign-in when no account has the given email, so a miss costs
/// as much as a wrong password.
const UNMATCHABLE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$lMAvwZ/N0QZ7nxBK2Ke+zw$oMyXZ/qG9SpyLj89xf8GSpahX8ol+Yhx2eB15PF6h3Y";

/// Sign-up request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Authentication service.
///
/// Borrowed from the application state for the duration of one request.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tokens: &'a TokenKeys,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore, tokens: &'a TokenKeys, token_ttl: Duration) -> Self {
        Self {
            users,
            tokens,
            token_ttl,
        }
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if the first name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, request: SignUp) -> Result<User, AuthError> {
        let first_name = request.first_name.trim();
        if first_name.is_empty() {
            return Err(AuthError::MissingField("firstName"));
        }
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(NewUser {
                first_name: first_name.to_owned(),
                last_name: request.last_name.trim().to_owned(),
                email,
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Verify email and password and issue a credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self.check_password(email, password).await?;
        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// As [`sign_in`](Self::sign_in), but only admin accounts match.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the account is unknown, not
    /// an admin, or the password is wrong.
    pub async fn admin_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let user = self.check_password(email, password).await?;
        if !user.role.is_privileged() {
            tracing::warn!(user_id = %user.id, "Admin sign-in by non-admin account");
            return Err(AuthError::InvalidCredentials);
        }
        let token = self.issue(&user)?;
        Ok((user, token))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    async fn check_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed address cannot belong to an account
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.find_with_password(&email).await? else {
            let _ = verify_password(password, UNMATCHABLE_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(user)
    }

    fn issue(&self, user: &User) -> Result<String, AuthError> {
        let token = self.tokens.issue(user.id, user.role, self.token_ttl)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Credential issued");
        Ok(token)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is unparseable or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
