//! CMS Backend Module
//!
//! Marketing pages, the website template catalog and the blog.
//!
//! - `domain/` - Entities, slugs, repository traits
//! - `application/` - Use cases and listing configurations
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Slugs are unique per resource and derived from the title when not
//! given. Public routes only ever expose published posts.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{PageService, PostService, TemplateService};
pub use domain::{
    Page, PageRepository, Post, PostRepository, PostStatus, Slug, Template, TemplateRepository,
};
pub use error::{CmsError, CmsResult};
pub use infra::{memory::InMemoryCmsRepository, postgres::PgCmsRepository};
pub use presentation::router::{
    cms_admin_router, cms_admin_router_generic, cms_public_router, cms_public_router_generic,
};
