//! Application Layer
//!
//! Use cases for client projects and support tickets.

pub mod listing;
pub mod projects;
pub mod tickets;

// Re-exports
pub use projects::{CreateProjectInput, ProjectService, UpdateProjectInput};
pub use tickets::{CreateTicketInput, TicketService};
