//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{project::Project, ticket::Ticket};
pub use repository::{ProjectFilter, ProjectRepository, TicketFilter, TicketRepository};
pub use value_object::{
    project_status::ProjectStatus, ticket_priority::TicketPriority, ticket_status::TicketStatus,
};
