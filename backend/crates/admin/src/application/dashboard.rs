use std::sync::Arc;

use auth::{Action, CurrentUser, Resource, require};

use crate::domain::entity::dashboard::DashboardStats;
use crate::domain::repository::StatsRepository;
use crate::error::AdminResult;

pub struct DashboardService<S>
where
    S: StatsRepository,
{
    stats: Arc<S>,
}

impl<S> DashboardService<S>
where
    S: StatsRepository,
{
    pub fn new(stats: Arc<S>) -> Self {
        Self { stats }
    }

    pub async fn stats(&self, user: &CurrentUser) -> AdminResult<DashboardStats> {
        require(Some(user), Resource::Dashboard, Action::Read)?;
        self.stats.dashboard_stats().await
    }
}
