//! Bearer credential extractors.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use tech_commerce_core::{Claims, bearer_token};

use crate::error::AppError;
use crate::state::AppState;

fn verify(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(bearer_token)
        .filter(|t| !t.is_empty());

    let claims = state.tokens().verify(token)?;
    Span::current().record("user_id", claims.user_id.as_i32());
    Ok(claims)
}

/// Extractor for any caller holding a valid credential.
pub struct BearerAuth(pub Claims);

impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        verify(parts, state).map(Self)
    }
}

/// Extractor for callers holding the admin role. `401` comes before `403`.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = verify(parts, state)?;
        if !claims.role.is_privileged() {
            tracing::warn!(user_id = %claims.user_id, "Admin access denied");
            return Err(AppError::Forbidden);
        }
        Ok(Self(claims))
    }
}
