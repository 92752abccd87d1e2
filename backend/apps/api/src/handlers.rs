//! Handlers owned by the HTTP app itself

use std::any::Any;

use axum::Json;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    tracing::debug!(%method, path = %uri.path(), "No route matched");
    AppError::not_found(format!("No route for {method} {}", uri.path()))
}

/// Turn a handler panic into the standard 500 envelope
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    tracing::error!(panic = %detail, "Handler panicked");
    AppError::internal("Handler panicked").into_response()
}
