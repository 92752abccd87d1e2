//! Domain Layer
//!
//! Contains statistics types and the aggregate repository trait.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::analytics::{MonthlyRevenue, RevenueBucket, StatusCount, YearMonth};
pub use entity::dashboard::DashboardStats;
pub use repository::StatsRepository;
pub use value_object::analytics_months::AnalyticsMonths;
