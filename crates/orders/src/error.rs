//! Unified error handling with Sentry integration.
//!
//! Every failure is caught at the HTTP boundary and turned into a status code
//! plus a JSON `{"message": ...}` body. Nothing is retried.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use tech_commerce_core::TokenError;

use crate::db::RepositoryError;
use crate::services::{OrderError, ValidationError};

/// Application-level error type for the order service.
#[derive(Debug, Error)]
pub enum AppError {
    /// No credential was presented.
    #[error("Unauthorized: No token provided")]
    Unauthenticated,

    /// The credential is malformed, expired, or has a bad signature.
    #[error("Invalid or expired token")]
    InvalidCredential,

    /// The caller lacks the privileged role.
    #[error("Forbidden: Admin access required")]
    Forbidden,

    /// The submitted order is structurally incomplete.
    #[error("Invalid order data: {0}")]
    InvalidOrder(#[from] ValidationError),

    /// A referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The persistence layer failed.
    #[error("Storage error: {0}")]
    StorageUnavailable(#[from] RepositoryError),

    /// Internal server error.
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

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Invalid(e) => Self::InvalidOrder(e),
            OrderError::OwnerNotFound(_) => Self::NotFound("User not found".to_owned()),
            OrderError::Repository(e) => Self::StorageUnavailable(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidOrder(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StorageUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
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

        (self.status(), Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::InvalidCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::InvalidOrder(ValidationError::NoItems)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("User not found".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::StorageUnavailable(RepositoryError::Unavailable(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        assert!(matches!(
            AppError::from(TokenError::Missing),
            AppError::Unauthenticated
        ));
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = AppError::StorageUnavailable(RepositoryError::Unavailable(
            "connection refused to 10.0.0.3".to_string(),
        ));
        let body = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        assert_eq!(&body[..], br#"{"message":"Server error"}"#);
    }
}
