//! Portal Error Types

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::ticket_status::TicketStatus;

pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Project not found")]
    ProjectNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Closed tickets cannot be changed")]
    TicketClosed,

    /// Another request changed the status after it was read
    #[error("Ticket status changed concurrently; it is now '{current}'")]
    StatusChanged { current: TicketStatus },

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortalError::ProjectNotFound | PortalError::TicketNotFound => ErrorKind::NotFound,
            PortalError::TicketClosed | PortalError::StatusChanged { .. } => ErrorKind::Conflict,
            PortalError::App(e) => e.kind(),
            PortalError::Auth(e) => e.kind(),
            PortalError::Database(_) | PortalError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            PortalError::Database(e) => tracing::error!(error = %e, "Portal database error"),
            PortalError::Internal(msg) => tracing::error!(message = %msg, "Portal internal error"),
            _ => tracing::debug!(error = %self, "Portal error"),
        }
    }
}

impl From<PortalError> for AppError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::App(inner) => inner,
            PortalError::Auth(inner) => inner.into(),
            PortalError::Database(e) => AppError::from(e),
            PortalError::TicketClosed => AppError::conflict(err.to_string())
                .with_action("Open a new ticket instead"),
            PortalError::StatusChanged { .. } => {
                AppError::conflict(err.to_string()).with_action("Reload the ticket and try again")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for PortalError {
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
        assert_eq!(PortalError::ProjectNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(PortalError::TicketClosed.kind(), ErrorKind::Conflict);
        assert_eq!(
            PortalError::Internal("boom".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let app: AppError = PortalError::Internal("connection string leaked".into()).into();
        assert_eq!(app.status_code(), 500);
        assert!(!app.public_message().contains("leaked"));
    }
}
