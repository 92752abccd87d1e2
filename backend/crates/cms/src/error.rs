//! CMS Error Types

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type CmsResult<T> = Result<T, CmsError>;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("Page not found")]
    PageNotFound,

    #[error("Template not found")]
    TemplateNotFound,

    #[error("Post not found")]
    PostNotFound,

    /// Unique slug violation
    #[error("Slug '{0}' is already in use")]
    SlugTaken(String),

    /// Validation or policy error already expressed as an AppError
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CmsError::PageNotFound | CmsError::TemplateNotFound | CmsError::PostNotFound => {
                ErrorKind::NotFound
            }
            CmsError::SlugTaken(_) => ErrorKind::Conflict,
            CmsError::App(e) => e.kind(),
            CmsError::Auth(e) => e.kind(),
            CmsError::Database(_) | CmsError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            CmsError::Database(e) => tracing::error!(error = %e, "CMS database error"),
            CmsError::Internal(msg) => tracing::error!(message = %msg, "CMS internal error"),
            CmsError::SlugTaken(slug) => tracing::debug!(%slug, "Duplicate slug"),
            _ => tracing::debug!(error = %self, "CMS error"),
        }
    }

    /// Map a unique violation on insert/update to [`CmsError::SlugTaken`]
    pub(crate) fn from_write(err: sqlx::Error, slug: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CmsError::SlugTaken(slug.to_string())
            }
            _ => CmsError::Database(err),
        }
    }
}

impl From<CmsError> for AppError {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::App(inner) => inner,
            CmsError::Auth(inner) => inner.into(),
            CmsError::Database(e) => AppError::from(e),
            CmsError::SlugTaken(_) => AppError::conflict(err.to_string())
                .with_action("Choose a different slug"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
