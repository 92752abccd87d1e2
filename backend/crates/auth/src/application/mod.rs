//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod csrf;
pub mod login;
pub mod policy;
pub mod register;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use policy::{Action, Resource, authorize, require};
pub use register::{RegisterInput, RegisterUseCase};
