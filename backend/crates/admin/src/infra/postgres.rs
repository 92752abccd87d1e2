//! PostgreSQL aggregates

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entity::analytics::{RevenueBucket, YearMonth};
use crate::domain::entity::dashboard::{
    ContentStats, DashboardStats, InvoiceStats, ProjectStats, TicketStats, UserStats,
};
use crate::domain::repository::StatsRepository;
use crate::error::{AdminError, AdminResult};

#[derive(Clone)]
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    users_total: i64,
    users_clients: i64,
    users_admins: i64,
    projects_total: i64,
    projects_active: i64,
    projects_completed: i64,
    invoices_total: i64,
    invoices_outstanding: i64,
    outstanding_amount: i64,
    paid_revenue: i64,
    tickets_total: i64,
    tickets_open: i64,
    pages: i64,
    published_posts: i64,
    templates: i64,
}

impl DashboardRow {
    fn into_stats(self) -> DashboardStats {
        DashboardStats {
            users: UserStats {
                total: count(self.users_total),
                clients: count(self.users_clients),
                admins: count(self.users_admins),
            },
            projects: ProjectStats {
                total: count(self.projects_total),
                active: count(self.projects_active),
                completed: count(self.projects_completed),
            },
            invoices: InvoiceStats {
                total: count(self.invoices_total),
                outstanding: count(self.invoices_outstanding),
                outstanding_amount: self.outstanding_amount,
                paid_revenue: self.paid_revenue,
            },
            tickets: TicketStats {
                total: count(self.tickets_total),
                open: count(self.tickets_open),
            },
            content: ContentStats {
                pages: count(self.pages),
                published_posts: count(self.published_posts),
                templates: count(self.templates),
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct RevenueRow {
    year: i32,
    month: i32,
    revenue: i64,
    invoices: i64,
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    status: String,
    count: i64,
}

impl StatsRepository for PgStatsRepository {
    async fn dashboard_stats(&self) -> AdminResult<DashboardStats> {
        let row = sqlx::query_as::<_, DashboardRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users_total,
                (SELECT COUNT(*) FROM users WHERE role = 'client') AS users_clients,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS users_admins,
                (SELECT COUNT(*) FROM projects) AS projects_total,
                (SELECT COUNT(*) FROM projects WHERE status IN ('in_progress', 'review'))
                    AS projects_active,
                (SELECT COUNT(*) FROM projects WHERE status = 'completed') AS projects_completed,
                (SELECT COUNT(*) FROM invoices) AS invoices_total,
                (SELECT COUNT(*) FROM invoices WHERE status IN ('sent', 'overdue'))
                    AS invoices_outstanding,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM invoices
                    WHERE status IN ('sent', 'overdue')) AS outstanding_amount,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM invoices WHERE status = 'paid')
                    AS paid_revenue,
                (SELECT COUNT(*) FROM tickets) AS tickets_total,
                (SELECT COUNT(*) FROM tickets WHERE status IN ('open', 'in_progress'))
                    AS tickets_open,
                (SELECT COUNT(*) FROM pages) AS pages,
                (SELECT COUNT(*) FROM posts WHERE status = 'published') AS published_posts,
                (SELECT COUNT(*) FROM templates) AS templates
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_stats())
    }

    async fn paid_revenue_since(&self, since: DateTime<Utc>) -> AdminResult<Vec<RevenueBucket>> {
        let rows = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT
                EXTRACT(YEAR FROM paid_at AT TIME ZONE 'UTC')::INT AS year,
                EXTRACT(MONTH FROM paid_at AT TIME ZONE 'UTC')::INT AS month,
                COALESCE(SUM(amount), 0)::BIGINT AS revenue,
                COUNT(*) AS invoices
            FROM invoices
            WHERE status = 'paid' AND paid_at >= $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let month = u32::try_from(row.month).map_err(|_| {
                    AdminError::Internal(format!("month out of range: {}", row.month))
                })?;
                Ok(RevenueBucket {
                    month: YearMonth {
                        year: row.year,
                        month,
                    },
                    revenue: row.revenue,
                    invoices: count(row.invoices),
                })
            })
            .collect()
    }

    async fn project_status_counts(&self) -> AdminResult<Vec<(String, u64)>> {
        let rows = sqlx::query_as::<_, StatusRow>(
            "SELECT status, COUNT(*) AS count FROM projects GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.status, count(r.count))).collect())
    }

    async fn ticket_status_counts(&self) -> AdminResult<Vec<(String, u64)>> {
        let rows = sqlx::query_as::<_, StatusRow>(
            "SELECT status, COUNT(*) AS count FROM tickets GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.status, count(r.count))).collect())
    }
}
