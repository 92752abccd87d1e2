//! Admin Back-Office Module
//!
//! - Dashboard counters across users, projects, invoices, tickets and content
//! - User administration (list, change role, delete)
//! - BI analytics: monthly paid revenue and status distributions
//!
//! Reads the other modules' tables through [`StatsRepository`]; user
//! changes go through `auth`'s [`auth::UserRepository`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{AnalyticsService, DashboardService, UserAdminService};
pub use domain::{AnalyticsMonths, DashboardStats, MonthlyRevenue, StatsRepository, StatusCount};
pub use error::{AdminError, AdminResult};
pub use infra::{memory::InMemoryStatsRepository, postgres::PgStatsRepository};
pub use presentation::router::{admin_router, admin_router_generic};
