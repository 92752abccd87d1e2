//! Application Layer
//!
//! Dashboard, user administration and analytics use cases.

pub mod analytics;
pub mod dashboard;
pub mod listing;
pub mod users;

// Re-exports
pub use analytics::{AnalyticsOverview, AnalyticsService};
pub use dashboard::DashboardService;
pub use users::UserAdminService;
