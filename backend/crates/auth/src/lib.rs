//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases, tokens, CSRF, authorization policy
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Client registration and email + password login
//! - Stateless HS256 session tokens via cookie or `Authorization: Bearer`
//! - Double-submit CSRF tokens for cookie sessions
//! - A single authorization policy for every role check
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Session cookie is HttpOnly; the CSRF cookie is script-readable
//! - Invalid cookie tokens are cleared on the response

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::policy::{Action, Resource, authorize, require};
pub use domain::{CurrentUser, Email, User, UserRepository, UserRole};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryUserRepository, postgres::PgUserRepository};
pub use presentation::extractor::AdminUser;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
