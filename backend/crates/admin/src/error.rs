//! Admin Error Types

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::App(e) => e.kind(),
            AdminError::Auth(e) => e.kind(),
            AdminError::Database(_) | AdminError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            AdminError::Database(e) => tracing::error!(error = %e, "Admin database error"),
            AdminError::Internal(msg) => tracing::error!(message = %msg, "Admin internal error"),
            _ => tracing::debug!(error = %self, "Admin error"),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::App(inner) => inner,
            AdminError::Auth(inner) => inner.into(),
            AdminError::Database(e) => AppError::from(e),
            AdminError::Internal(msg) => AppError::internal(msg),
        }
    }
}

impl IntoResponse for AdminError {
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
        assert_eq!(
            AdminError::from(AuthError::UserNotFound).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AdminError::from(AuthError::Forbidden).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            AdminError::from(AuthError::CannotDeleteSelf).kind(),
            ErrorKind::Forbidden
        );
    }
}
