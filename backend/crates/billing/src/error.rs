//! Billing Error Types

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::invoice_status::InvoiceStatus;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Pricing plan not found")]
    PlanNotFound,

    #[error("Invoice not found")]
    InvoiceNotFound,

    #[error("Slug '{0}' is already in use")]
    SlugTaken(String),

    /// Generated invoice number collided with an existing one
    #[error("Invoice number '{0}' already exists")]
    NumberTaken(String),

    #[error("Cannot change invoice status from '{from}' to '{to}'")]
    InvalidTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    #[error("Only draft invoices can be deleted")]
    InvoiceNotDraft,

    /// Another request changed the status after it was read
    #[error("Invoice status changed concurrently; it is now '{current}'")]
    StatusChanged { current: InvoiceStatus },

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::PlanNotFound | BillingError::InvoiceNotFound => ErrorKind::NotFound,
            BillingError::SlugTaken(_)
            | BillingError::NumberTaken(_)
            | BillingError::InvoiceNotDraft
            | BillingError::StatusChanged { .. } => ErrorKind::Conflict,
            BillingError::InvalidTransition { .. } => ErrorKind::BadRequest,
            BillingError::App(e) => e.kind(),
            BillingError::Auth(e) => e.kind(),
            BillingError::Database(_) | BillingError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    fn log(&self) {
        match self {
            BillingError::Database(e) => tracing::error!(error = %e, "Billing database error"),
            BillingError::Internal(msg) => {
                tracing::error!(message = %msg, "Billing internal error")
            }
            BillingError::InvalidTransition { from, to } => {
                tracing::warn!(%from, %to, "Rejected invoice status transition")
            }
            _ => tracing::debug!(error = %self, "Billing error"),
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::App(inner) => inner,
            BillingError::Auth(inner) => inner.into(),
            BillingError::Database(e) => AppError::from(e),
            BillingError::InvalidTransition { from, .. } => {
                let allowed: Vec<&str> = from.allowed_next().iter().map(|s| s.code()).collect();
                let action = if allowed.is_empty() {
                    format!("'{from}' is final")
                } else {
                    format!("Allowed next statuses: {}", allowed.join(", "))
                };
                AppError::bad_request(err.to_string()).with_action(action)
            }
            BillingError::StatusChanged { .. } => {
                AppError::conflict(err.to_string()).with_action("Reload the invoice and try again")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for BillingError {
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
        assert_eq!(BillingError::InvoiceNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(BillingError::InvoiceNotDraft.kind(), ErrorKind::Conflict);
        assert_eq!(
            BillingError::StatusChanged {
                current: InvoiceStatus::Paid
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            BillingError::InvalidTransition {
                from: InvoiceStatus::Paid,
                to: InvoiceStatus::Sent
            }
            .kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_transition_error_lists_allowed_statuses() {
        let app: AppError = BillingError::InvalidTransition {
            from: InvoiceStatus::Draft,
            to: InvoiceStatus::Paid,
        }
        .into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.action(), Some("Allowed next statuses: sent, cancelled"));

        let app: AppError = BillingError::InvalidTransition {
            from: InvoiceStatus::Paid,
            to: InvoiceStatus::Draft,
        }
        .into();
        assert_eq!(app.action(), Some("'paid' is final"));
    }
}
