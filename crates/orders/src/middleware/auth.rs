//! Credential extractors.
//!
//! Read endpoints take the credential from `Authorization: Bearer <token>`.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use tech_commerce_core::{Claims, bearer_token};

use crate::error::AppError;
use crate::state::AppState;

/// The token from the `Authorization` header, if any.
#[must_use]
pub fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(bearer_token)
        .filter(|t| !t.is_empty())
}

/// Verify `token` and attach the caller to the request span.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` when `token` is `None` and
/// `AppError::InvalidCredential` when it fails verification.
pub fn authenticate(state: &AppState, token: Option<&str>) -> Result<Claims, AppError> {
    let claims = state.tokens().verify(token)?;
    Span::current().record("user_id", claims.user_id.as_i32());
    Ok(claims)
}

/// Extractor for any authenticated caller.
///
/// ```rust,ignore
/// async fn handler(BearerAuth(claims): BearerAuth) -> String {
///     format!("hello {}", claims.user_id)
/// }
/// ```
pub struct BearerAuth(pub Claims);

impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(state, header_token(&parts.headers)).map(Self)
    }
}

/// Extractor for callers holding the privileged role.
///
/// Rejects with `401` before `403`: an anonymous caller is told to
/// authenticate, not that they lack privilege.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = authenticate(state, header_token(&parts.headers))?;
        if !claims.role.is_privileged() {
            tracing::warn!(user_id = %claims.user_id, role = %claims.role, "Admin access denied");
            return Err(AppError::Forbidden);
        }
        Ok(Self(claims))
    }
}
