//! CMS Routers

use auth::middleware::require_admin;
use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::domain::repository::{PageRepository, PostRepository, TemplateRepository};
use crate::infra::postgres::PgCmsRepository;
use crate::presentation::handlers::{self, CmsAppState};

/// Public catalog routes, mounted under `/api`
pub fn cms_public_router(repo: PgCmsRepository) -> Router {
    cms_public_router_generic(repo)
}

/// Admin content routes, mounted under `/api/admin`
pub fn cms_admin_router(repo: PgCmsRepository) -> Router {
    cms_admin_router_generic(repo)
}

pub fn cms_public_router_generic<R>(repo: R) -> Router
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let state = CmsAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route("/pages", get(handlers::list_pages::<R>))
        .route("/pages/{slug}", get(handlers::get_page_by_slug::<R>))
        .route("/templates", get(handlers::list_templates::<R>))
        .route("/templates/{id}", get(handlers::get_template::<R>))
        .route("/blog/posts", get(handlers::list_published_posts::<R>))
        .route("/blog/posts/{slug}", get(handlers::get_published_post::<R>))
        .with_state(state)
}

/// Every route requires an admin; non-admins never reach a handler.
pub fn cms_admin_router_generic<R>(repo: R) -> Router
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let state = CmsAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .route(
            "/pages",
            get(handlers::admin_list_pages::<R>).post(handlers::create_page::<R>),
        )
        .route(
            "/pages/{id}",
            get(handlers::admin_get_page::<R>)
                .put(handlers::update_page::<R>)
                .delete(handlers::delete_page::<R>),
        )
        .route(
            "/templates",
            get(handlers::admin_list_templates::<R>).post(handlers::create_template::<R>),
        )
        .route(
            "/templates/{id}",
            get(handlers::get_template::<R>)
                .put(handlers::update_template::<R>)
                .delete(handlers::delete_template::<R>),
        )
        .route(
            "/posts",
            get(handlers::admin_list_posts::<R>).post(handlers::create_post::<R>),
        )
        .route(
            "/posts/{id}",
            get(handlers::admin_get_post::<R>)
                .put(handlers::update_post::<R>)
                .delete(handlers::delete_post::<R>),
        )
        .route_layer(middleware::from_fn(require_admin))
        .with_state(state)
}
