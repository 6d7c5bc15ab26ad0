//! Unified error handling with Sentry integration.
//!
//! Error bodies are `{"success": false, "message": ...}`, the shape the
//! sign-in clients already read.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tech_commerce_core::TokenError;

use crate::db::RepositoryError;
use crate::services::AuthError;

/// Application-level error type for the identity service.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No token provided")]
    Unauthenticated,

    #[error("Invalid or expired token")]
    InvalidCredential,

    #[error("Forbidden: Admin access required")]
    Forbidden,

    /// Sign-up input rejected.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown email, wrong password, or wrong role at sign-in.
    #[error("Invalid email or password")]
    SignInFailed,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageUnavailable(#[from] RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::Unauthenticated,
            TokenError::Invalid(e) => {
                tracing::debug!(error = %e, "Rejected credential");
                Self::InvalidCredential
            }
            TokenError::Signing(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_) | AuthError::MissingField(_) | AuthError::WeakPassword(_) => {
                Self::BadRequest(err.to_string())
            }
            AuthError::InvalidCredentials => Self::SignInFailed,
            AuthError::UserNotFound => Self::NotFound("User not found".to_owned()),
            AuthError::UserAlreadyExists => Self::Conflict("Email already in use".to_owned()),
            AuthError::Token(e) => e.into(),
            AuthError::Repository(e) => Self::StorageUnavailable(e),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredential | Self::SignInFailed => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StorageUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::StorageUnavailable(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::StorageUnavailable(_) | Self::Internal(_) => "Server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorBody {
            success: false,
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::UserAlreadyExists, StatusCode::CONFLICT),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::WeakPassword("short".to_owned()), StatusCode::BAD_REQUEST),
            (AuthError::MissingField("firstName"), StatusCode::BAD_REQUEST),
            (AuthError::PasswordHash, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_body_shape_hides_internals() {
        let err = AppError::StorageUnavailable(RepositoryError::Unavailable(
            "connection refused to 10.0.0.3".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        assert_eq!(&body[..], br#"{"success":false,"message":"Server error"}"#);
    }
}
