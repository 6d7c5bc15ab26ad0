//! HTTP middleware and extractors for the order service.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (browser clients on other origins)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the request span and Sentry scope)
//!
//! Authentication is not a layer: handlers opt in with the [`BearerAuth`] and
//! [`RequireAdmin`] extractors, because `POST /api/order` also accepts the
//! credential in its body.

pub mod auth;
pub mod request_id;

pub use auth::{BearerAuth, RequireAdmin, header_token};
pub use request_id::request_id_middleware;
