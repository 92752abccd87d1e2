//! Portal Routers

use auth::middleware::{require_admin, require_user};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use platform::rate_limit::{RateLimitState, RateLimitStore, rate_limit};
use std::sync::Arc;

use crate::domain::repository::{ProjectRepository, TicketRepository};
use crate::infra::postgres::PgPortalRepository;
use crate::presentation::handlers::{self, PortalAppState};

/// Project and ticket management, mounted under `/api/admin`
pub fn portal_admin_router(repo: PgPortalRepository) -> Router {
    portal_admin_router_generic(repo)
}

/// The client's own projects and tickets, mounted under `/api/portal`
pub fn portal_client_router<S>(repo: PgPortalRepository, limiter: RateLimitState<S>) -> Router
where
    S: RateLimitStore + Send + Sync + 'static,
{
    portal_client_router_generic(repo, limiter)
}

pub fn portal_admin_router_generic<R>(repo: R) -> Router
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let state = PortalAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route(
            "/projects",
            get(handlers::list_projects::<R>).post(handlers::create_project::<R>),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project::<R>)
                .put(handlers::update_project::<R>)
                .delete(handlers::delete_project::<R>),
        )
        .route("/tickets", get(handlers::list_tickets::<R>))
        .route("/tickets/{id}", get(handlers::get_ticket::<R>))
        .route(
            "/tickets/{id}/status",
            patch(handlers::update_ticket_status::<R>),
        )
        .route_layer(middleware::from_fn(require_admin))
        .with_state(state)
}

/// Opening a ticket is rate limited by `limiter`.
pub fn portal_client_router_generic<R, S>(repo: R, limiter: RateLimitState<S>) -> Router
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
    S: RateLimitStore + Send + Sync + 'static,
{
    let state = PortalAppState {
        repo: Arc::new(repo),
    };

    let open_ticket = post(handlers::create_ticket::<R>)
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit::<S>));

    Router::new()
        .route("/projects", get(handlers::list_my_projects::<R>))
        .route("/projects/{id}", get(handlers::get_project::<R>))
        .route(
            "/tickets",
            get(handlers::list_my_tickets::<R>).merge(open_ticket),
        )
        .route("/tickets/{id}", get(handlers::get_ticket::<R>))
        .route_layer(middleware::from_fn(require_user))
        .with_state(state)
}
