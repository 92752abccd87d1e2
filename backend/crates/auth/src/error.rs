//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid session on a route that needs one
    #[error("Authentication required")]
    Unauthenticated,

    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token signature, format or claims rejected
    #[error("Invalid session token")]
    TokenInvalid,

    #[error("Session token has expired")]
    TokenExpired,

    /// Authenticated but not allowed
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Cookie-authenticated mutation without a matching CSRF header
    #[error("CSRF token missing or invalid")]
    CsrfMismatch,

    #[error("User not found")]
    UserNotFound,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Administrators cannot delete their own account")]
    CannotDeleteSelf,

    /// Input or policy error already expressed as an AppError
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Unauthenticated
            | AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired => ErrorKind::Unauthorized,
            AuthError::Forbidden | AuthError::CsrfMismatch | AuthError::CannotDeleteSelf => {
                ErrorKind::Forbidden
            }
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::App(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::CsrfMismatch => {
                tracing::warn!("CSRF validation failed");
            }
            AuthError::Forbidden => {
                tracing::warn!("Forbidden request");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::App(inner) => inner,
            AuthError::Database(e) => AppError::from(e),
            AuthError::Unauthenticated => {
                AppError::unauthorized(AuthError::Unauthenticated.to_string())
                    .with_action("Log in and try again")
            }
            AuthError::CsrfMismatch => AppError::forbidden(AuthError::CsrfMismatch.to_string())
                .with_action("Send the csrf_token cookie value in the x-csrf-token header"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Unauthenticated.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::TokenExpired.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::CsrfMismatch.kind(), ErrorKind::Forbidden);
        assert_eq!(AuthError::EmailTaken.kind(), ErrorKind::Conflict);
        assert_eq!(
            AuthError::Internal("x".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_wrapped_app_error_keeps_kind() {
        let err = AuthError::from(AppError::bad_request("bad email"));
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.message(), "bad email");
    }

    #[test]
    fn test_unauthenticated_has_action() {
        let app: AppError = AuthError::Unauthenticated.into();
        assert_eq!(app.status_code(), 401);
        assert!(app.action().is_some());
    }
}
