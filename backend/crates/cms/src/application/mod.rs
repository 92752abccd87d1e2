//! Application Layer
//!
//! Use cases for pages, templates and blog posts.

pub mod listing;
pub mod pages;
pub mod posts;
pub mod templates;

// Re-exports
pub use pages::{CreatePageInput, PageService, UpdatePageInput};
pub use posts::{CreatePostInput, PostService, UpdatePostInput};
pub use templates::{CreateTemplateInput, TemplateService, UpdateTemplateInput};
