//! Admin Router

use auth::PgUserRepository;
use auth::UserRepository;
use auth::middleware::require_admin;
use axum::{
    Router, middleware,
    routing::{delete, get, patch},
};
use std::sync::Arc;

use crate::domain::repository::StatsRepository;
use crate::infra::postgres::PgStatsRepository;
use crate::presentation::handlers::{self, AdminAppState};

/// Dashboard, users and analytics, mounted under `/api/admin`
pub fn admin_router(users: PgUserRepository, stats: PgStatsRepository) -> Router {
    admin_router_generic(users, stats)
}

pub fn admin_router_generic<U, S>(users: U, stats: S) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let state = AdminAppState {
        users: Arc::new(users),
        stats: Arc::new(stats),
    };

    Router::new()
        .route("/dashboard", get(handlers::dashboard::<U, S>))
        .route("/users", get(handlers::list_users::<U, S>))
        .route("/users/{id}", delete(handlers::delete_user::<U, S>))
        .route("/users/{id}/role", patch(handlers::update_user_role::<U, S>))
        .route("/analytics", get(handlers::analytics_overview::<U, S>))
        .route("/analytics/revenue", get(handlers::revenue::<U, S>))
        .route("/analytics/projects", get(handlers::project_distribution::<U, S>))
        .route("/analytics/tickets", get(handlers::ticket_distribution::<U, S>))
        .route_layer(middleware::from_fn(require_admin))
        .with_state(state)
}
