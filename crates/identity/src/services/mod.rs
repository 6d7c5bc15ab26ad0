//! Business logic of the identity service.

pub mod auth;

pub use auth::{AuthError, AuthService, SignUp};
