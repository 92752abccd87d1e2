//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{page::Page, post::Post, template::Template};
pub use repository::{PageRepository, PostRepository, TemplateRepository};
pub use kernel::slug::Slug;
pub use value_object::post_status::PostStatus;
