//! BI analytics
//!
//! Revenue counts paid invoices only, bucketed by the month they were paid.

use std::sync::Arc;

use auth::{Action, CurrentUser, Resource, require};
use chrono::{DateTime, TimeZone, Utc};
use portal::{ProjectStatus, TicketStatus};
use serde::Serialize;

use crate::domain::entity::analytics::{
    MonthlyRevenue, StatusCount, YearMonth, distribution, revenue_series,
};
use crate::domain::repository::StatsRepository;
use crate::domain::value_object::analytics_months::AnalyticsMonths;
use crate::error::{AdminError, AdminResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub revenue: Vec<MonthlyRevenue>,
    pub projects: Vec<StatusCount>,
    pub tickets: Vec<StatusCount>,
}

pub struct AnalyticsService<S>
where
    S: StatsRepository,
{
    stats: Arc<S>,
}

impl<S> AnalyticsService<S>
where
    S: StatsRepository,
{
    pub fn new(stats: Arc<S>) -> Self {
        Self { stats }
    }

    pub async fn monthly_revenue(
        &self,
        user: &CurrentUser,
        months: AnalyticsMonths,
    ) -> AdminResult<Vec<MonthlyRevenue>> {
        self.monthly_revenue_at(user, months, Utc::now()).await
    }

    pub async fn monthly_revenue_at(
        &self,
        user: &CurrentUser,
        months: AnalyticsMonths,
        now: DateTime<Utc>,
    ) -> AdminResult<Vec<MonthlyRevenue>> {
        require(Some(user), Resource::Dashboard, Action::Read)?;

        let window = YearMonth::window(now, months.get());
        let since = window
            .first()
            .and_then(YearMonth::first_day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| Utc.from_utc_datetime(&d))
            .ok_or_else(|| AdminError::Internal(format!("no revenue window for {now}")))?;

        let buckets = self.stats.paid_revenue_since(since).await?;
        Ok(revenue_series(&window, &buckets))
    }

    pub async fn project_distribution(&self, user: &CurrentUser) -> AdminResult<Vec<StatusCount>> {
        require(Some(user), Resource::Dashboard, Action::Read)?;
        let counts = self.stats.project_status_counts().await?;
        Ok(distribution(ProjectStatus::ALL.map(|s| s.code()), &counts))
    }

    pub async fn ticket_distribution(&self, user: &CurrentUser) -> AdminResult<Vec<StatusCount>> {
        require(Some(user), Resource::Dashboard, Action::Read)?;
        let counts = self.stats.ticket_status_counts().await?;
        Ok(distribution(TicketStatus::ALL.map(|s| s.code()), &counts))
    }

    pub async fn overview(
        &self,
        user: &CurrentUser,
        months: AnalyticsMonths,
    ) -> AdminResult<AnalyticsOverview> {
        Ok(AnalyticsOverview {
            revenue: self.monthly_revenue(user, months).await?,
            projects: self.project_distribution(user).await?,
            tickets: self.ticket_distribution(user).await?,
        })
    }
}
