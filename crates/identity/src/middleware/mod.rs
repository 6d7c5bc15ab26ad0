//! Middleware and extractors for the identity service.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{BearerAuth, RequireAdmin};
pub use rate_limit::sign_in_rate_limiter;
pub use request_id::request_id_middleware;
