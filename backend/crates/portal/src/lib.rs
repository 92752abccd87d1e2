//! Client Portal Backend Module
//!
//! Projects the agency runs for its clients and the support tickets
//! clients open against them.
//!
//! - `domain/` - Projects, tickets and their statuses
//! - `application/` - Use cases and listing configurations
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Admins manage everything. Clients read their own projects and tickets
//! and open new tickets, which is rate limited per caller.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{ProjectService, TicketService};
pub use domain::{
    Project, ProjectFilter, ProjectRepository, ProjectStatus, Ticket, TicketFilter,
    TicketPriority, TicketRepository, TicketStatus,
};
pub use error::{PortalError, PortalResult};
pub use infra::{memory::InMemoryPortalRepository, postgres::PgPortalRepository};
pub use presentation::router::{
    portal_admin_router, portal_admin_router_generic, portal_client_router,
    portal_client_router_generic,
};
