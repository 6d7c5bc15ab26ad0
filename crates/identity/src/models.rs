//! Identity accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tech_commerce_core::{Email, Role, UserId};

/// A registered account as exposed over the API.
///
/// Password hashes live only in the store and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An account about to be created, with its password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}
