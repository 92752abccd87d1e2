//! Billing Routers

use auth::middleware::{require_admin, require_user};
use axum::{
    Router, middleware,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::domain::repository::{InvoiceRepository, PricingPlanRepository};
use crate::infra::postgres::PgBillingRepository;
use crate::presentation::handlers::{self, BillingAppState};

/// `GET /pricing/plans`, mounted under `/api`
pub fn billing_public_router(repo: PgBillingRepository) -> Router {
    billing_public_router_generic(repo)
}

/// Plan and invoice management, mounted under `/api/admin`
pub fn billing_admin_router(repo: PgBillingRepository) -> Router {
    billing_admin_router_generic(repo)
}

/// The caller's own invoices, mounted under `/api/portal`
pub fn billing_portal_router(repo: PgBillingRepository) -> Router {
    billing_portal_router_generic(repo)
}

fn state<R>(repo: R) -> BillingAppState<R>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    BillingAppState {
        repo: Arc::new(repo),
    }
}

pub fn billing_public_router_generic<R>(repo: R) -> Router
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/pricing/plans", get(handlers::list_active_plans::<R>))
        .with_state(state(repo))
}

pub fn billing_admin_router_generic<R>(repo: R) -> Router
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/pricing-plans",
            get(handlers::list_plans::<R>).post(handlers::create_plan::<R>),
        )
        .route(
            "/pricing-plans/{id}",
            get(handlers::get_plan::<R>)
                .put(handlers::update_plan::<R>)
                .delete(handlers::delete_plan::<R>),
        )
        .route(
            "/invoices",
            get(handlers::list_invoices::<R>).post(handlers::create_invoice::<R>),
        )
        .route(
            "/invoices/{id}",
            get(handlers::get_invoice::<R>).delete(handlers::delete_invoice::<R>),
        )
        .route(
            "/invoices/{id}/status",
            patch(handlers::update_invoice_status::<R>),
        )
        .route_layer(middleware::from_fn(require_admin))
        .with_state(state(repo))
}

pub fn billing_portal_router_generic<R>(repo: R) -> Router
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/invoices", get(handlers::list_my_invoices::<R>))
        .route("/invoices/{id}", get(handlers::get_my_invoice::<R>))
        .route_layer(middleware::from_fn(require_user))
        .with_state(state(repo))
}
