//! Auth Middleware
//!
//! - [`authenticate`] resolves the caller from a Bearer header or the auth
//!   cookie and attaches [`CurrentUser`]; it never rejects.
//! - [`csrf_guard`] enforces the double-submit token on cookie sessions.
//! - [`require_admin`] / [`require_user`] gate whole routers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::cookie::{cookie_header, extract_cookie};
use platform::rate_limit::RateLimitSubject;

use crate::application::config::AuthConfig;
use crate::application::csrf::{requires_csrf, validate_csrf};
use crate::application::token::verify_token;
use crate::domain::entity::current_user::CurrentUser;
use crate::error::AuthError;
use crate::presentation::extractor::AuthSource;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Attach the caller, if any, to the request
///
/// A cookie token that fails verification gets both session cookies
/// deleted on the way out.
pub async fn authenticate(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> Response {
    let config = &state.config;

    let (token, source) = match bearer_token(req.headers()) {
        Some(token) => (Some(token), AuthSource::Bearer),
        None => (
            extract_cookie(req.headers(), &config.auth_cookie_name),
            AuthSource::Cookie,
        ),
    };

    let Some(token) = token else {
        return next.run(req).await;
    };

    let verified = verify_token(&token, &config.jwt_secret).and_then(|c| c.into_current_user());

    match verified {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, role = %user.role, ?source, "Authenticated request");
            req.extensions_mut()
                .insert(RateLimitSubject(user.id.to_string()));
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(source);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, ?source, "Ignoring invalid session token");
            let mut response = next.run(req).await;
            if source == AuthSource::Cookie {
                clear_session_cookies(response.headers_mut(), config);
            }
            response
        }
    }
}

/// Append `Set-Cookie` deletions for the auth and CSRF cookies
pub fn clear_session_cookies(headers: &mut HeaderMap, config: &AuthConfig) {
    for cookie in [
        config.auth_cookie().build_delete_cookie(),
        config.csrf_cookie().build_delete_cookie(),
    ] {
        if let Some(value) = cookie_header(&cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

/// Reject cookie-authenticated mutations on protected paths without a
/// matching `x-csrf-token` header. Bearer requests are exempt.
pub async fn csrf_guard(
    State(state): State<AuthMiddlewareState>,
    req: Request,
    next: Next,
) -> Response {
    let config = &state.config;

    let cookie_session = req.extensions().get::<AuthSource>() == Some(&AuthSource::Cookie);
    if cookie_session
        && requires_csrf(req.method(), req.uri().path(), &config.csrf_protected_prefixes)
    {
        let header_token = req
            .headers()
            .get(config.csrf_header_name.as_str())
            .and_then(|v| v.to_str().ok());
        let cookie_token = extract_cookie(req.headers(), &config.csrf_cookie_name);

        if !validate_csrf(header_token, cookie_token.as_deref()) {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request without valid CSRF token"
            );
            return AuthError::CsrfMismatch.into_response();
        }
    }

    next.run(req).await
}

/// 401 unless a user is attached
pub async fn require_user(req: Request, next: Next) -> Response {
    if req.extensions().get::<CurrentUser>().is_none() {
        return AuthError::Unauthenticated.into_response();
    }
    next.run(req).await
}

/// 401 when anonymous, 403 unless the user is an admin
pub async fn require_admin(req: Request, next: Next) -> Response {
    let rejection = match req.extensions().get::<CurrentUser>() {
        None => Some(AuthError::Unauthenticated),
        Some(user) if !user.is_admin() => {
            tracing::warn!(user_id = %user.id, path = %req.uri().path(), "Non-admin on admin route");
            Some(AuthError::Forbidden)
        }
        Some(_) => None,
    };

    match rejection {
        Some(err) => err.into_response(),
        None => next.run(req).await,
    }
}
