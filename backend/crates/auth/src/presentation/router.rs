//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::rate_limit::{RateLimitState, RateLimitStore, rate_limit};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::infra::postgres::PgUserRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router<S>(
    repo: PgUserRepository,
    config: Arc<AuthConfig>,
    limiter: RateLimitState<S>,
) -> Router
where
    S: RateLimitStore + Send + Sync + 'static,
{
    auth_router_generic(repo, config, limiter)
}

/// Create a generic Auth router for any repository implementation
///
/// Login and registration are rate limited by `limiter`.
pub fn auth_router_generic<R, S>(
    repo: R,
    config: Arc<AuthConfig>,
    limiter: RateLimitState<S>,
) -> Router
where
    R: UserRepository + Clone + Send + Sync + 'static,
    S: RateLimitStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config,
    };

    let limited = Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::<S>));

    Router::new()
        .route("/logout", post(handlers::logout::<R>))
        .route("/me", get(handlers::me::<R>))
        .merge(limited)
        .with_state(state)
}
