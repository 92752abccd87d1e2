//! Repository Traits
//!
//! Read-only aggregates over the other modules' tables.

use chrono::{DateTime, Utc};

use crate::domain::entity::{analytics::RevenueBucket, dashboard::DashboardStats};
use crate::error::AdminResult;

#[trait_variant::make(StatsRepository: Send)]
pub trait LocalStatsRepository {
    async fn dashboard_stats(&self) -> AdminResult<DashboardStats>;

    /// Paid invoices grouped by the month of `paid_at`, from `since` on
    async fn paid_revenue_since(&self, since: DateTime<Utc>) -> AdminResult<Vec<RevenueBucket>>;

    /// `(status code, count)` for every project status in use
    async fn project_status_counts(&self) -> AdminResult<Vec<(String, u64)>>;

    /// `(status code, count)` for every ticket status in use
    async fn ticket_status_counts(&self) -> AdminResult<Vec<(String, u64)>>;
}
