//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{current_user::CurrentUser, user::User};
pub use repository::UserRepository;
pub use value_object::{email::Email, user_role::UserRole};
