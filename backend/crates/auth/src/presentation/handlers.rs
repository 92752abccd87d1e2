//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::policy::{Action, Resource, require};
use crate::application::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use crate::domain::entity::current_user::CurrentUser;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::presentation::middleware::clear_session_cookies;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone());

    let user = use_case
        .execute(RegisterInput {
            email: req.email,
            name: req.name,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login
///
/// Sets the HttpOnly session cookie and the readable CSRF cookie.
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let auth_cookie = state.config.auth_cookie().build_set_cookie(&output.token);
    let csrf_cookie = state.config.csrf_cookie().build_set_cookie(&output.csrf_token);

    Ok((
        StatusCode::OK,
        AppendHeaders([
            (header::SET_COOKIE, auth_cookie),
            (header::SET_COOKIE, csrf_cookie),
        ]),
        Json(LoginResponse {
            user: output.user.into(),
            token: output.token,
            csrf_token: output.csrf_token,
            expires_in: state.config.token_ttl.as_secs(),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; logging out only deletes the cookies.
pub async fn logout<R>(State(state): State<AuthAppState<R>>) -> impl IntoResponse
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let mut headers = HeaderMap::new();
    clear_session_cookies(&mut headers, &state.config);
    (StatusCode::NO_CONTENT, headers)
}

/// GET /api/auth/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    current: CurrentUser,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    require(
        Some(&current),
        Resource::UserAccount {
            id: Some(current.id),
        },
        Action::Read,
    )?;

    let user = state
        .repo
        .find_by_id(current.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}
