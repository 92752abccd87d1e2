//! JasaWeb HTTP Application
//!
//! Composes the module routers into one axum [`Router`]:
//!
//! - `/api` - public catalog (pages, templates, blog, pricing), health, GraphQL
//! - `/api/auth` - register, login, logout, me
//! - `/api/admin` - back-office, admin role required
//! - `/api/portal` - client portal, any signed-in user
//!
//! Every request first passes `authenticate` and `csrf_guard`. Panics and
//! unknown routes come back as the usual JSON error envelope.

pub mod graphql;
pub mod handlers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use admin::{PgStatsRepository, StatsRepository};
use auth::middleware::{AuthMiddlewareState, authenticate, csrf_guard};
use auth::{AuthConfig, PgUserRepository, UserRepository};
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::{any, get};
use axum::{Router, middleware};
use billing::{InvoiceRepository, PgBillingRepository, PricingPlanRepository};
use cms::{PageRepository, PgCmsRepository, PostRepository, TemplateRepository};
use platform::client::TrustedProxies;
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitState};
use portal::{PgPortalRepository, ProjectRepository, TicketRepository};
use sqlx::PgPool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::graphql::{ServiceCatalog, build_schema, graphql_handler};

/// Ticket creation allowance per caller
const TICKET_RATE_LIMIT_MAX: u32 = 10;
const TICKET_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Everything the router needs, already constructed
pub struct AppParts<U, C, B, P, S> {
    pub users: U,
    pub cms: C,
    pub billing: B,
    pub portal: P,
    pub stats: S,
    pub auth: Arc<AuthConfig>,
    /// Limit on login and registration
    pub auth_rate_limit: RateLimitConfig,
    /// Proxies whose `X-Forwarded-For` is used for rate-limit keys
    pub trusted_proxies: TrustedProxies,
    pub frontend_origins: Vec<String>,
}

pub type PgAppParts =
    AppParts<PgUserRepository, PgCmsRepository, PgBillingRepository, PgPortalRepository, PgStatsRepository>;

impl PgAppParts {
    /// PostgreSQL repositories sharing one pool
    pub fn postgres(
        pool: PgPool,
        auth: Arc<AuthConfig>,
        auth_rate_limit: RateLimitConfig,
        trusted_proxies: TrustedProxies,
        frontend_origins: Vec<String>,
    ) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            cms: PgCmsRepository::new(pool.clone()),
            billing: PgBillingRepository::new(pool.clone()),
            portal: PgPortalRepository::new(pool.clone()),
            stats: PgStatsRepository::new(pool),
            auth,
            auth_rate_limit,
            trusted_proxies,
            frontend_origins,
        }
    }
}

fn cors_layer(origins: &[String], csrf_header: &str) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let mut headers = vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT];
    match HeaderName::try_from(csrf_header) {
        Ok(name) => headers.push(name),
        Err(e) => tracing::warn!(error = %e, header = csrf_header, "Invalid CSRF header name"),
    }

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list(headers))
        .allow_credentials(true)
}

/// Build the complete application router
pub fn build_router<U, C, B, P, S>(parts: AppParts<U, C, B, P, S>) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
    C: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
    B: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
    P: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    // Keys include the matched path, so one store serves every limiter.
    let store = Arc::new(InMemoryRateLimitStore::new());
    let auth_limiter = RateLimitState::new(store.clone(), parts.auth_rate_limit.clone())
        .with_trusted_proxies(parts.trusted_proxies.clone());
    let ticket_limiter = RateLimitState::new(
        store,
        RateLimitConfig::new(TICKET_RATE_LIMIT_MAX, TICKET_RATE_LIMIT_WINDOW_SECS),
    )
    .with_trusted_proxies(parts.trusted_proxies);

    let schema = build_schema(Arc::new(ServiceCatalog::new(
        Arc::new(parts.cms.clone()),
        Arc::new(parts.billing.clone()),
    )));

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/graphql", any(graphql_handler).with_state(schema))
        .merge(cms::cms_public_router_generic(parts.cms.clone()))
        .merge(billing::billing_public_router_generic(parts.billing.clone()));

    let back_office = Router::new()
        .merge(cms::cms_admin_router_generic(parts.cms))
        .merge(billing::billing_admin_router_generic(parts.billing.clone()))
        .merge(portal::portal_admin_router_generic(parts.portal.clone()))
        .merge(admin::admin_router_generic(parts.users.clone(), parts.stats));

    let client_portal = Router::new()
        .merge(billing::billing_portal_router_generic(parts.billing))
        .merge(portal::portal_client_router_generic(parts.portal, ticket_limiter));

    let api = public
        .nest(
            "/auth",
            auth::auth_router_generic(parts.users, parts.auth.clone(), auth_limiter),
        )
        .nest("/admin", back_office)
        .nest("/portal", client_portal);

    let auth_state = AuthMiddlewareState::new(parts.auth.clone());

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(auth_state.clone(), csrf_guard))
        .layer(middleware::from_fn_with_state(auth_state, authenticate))
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(cors_layer(&parts.frontend_origins, &parts.auth.csrf_header_name))
        .layer(TraceLayer::new_for_http())
}
