//! Aggregates over the other modules' in-memory stores
//!
//! Shares storage with the repositories the other routers use, so tests
//! see every write.

use auth::InMemoryUserRepository;
use billing::{InMemoryBillingRepository, InvoiceStatus};
use chrono::{DateTime, Utc};
use cms::{InMemoryCmsRepository, PostStatus};
use portal::{InMemoryPortalRepository, ProjectStatus};
use std::collections::BTreeMap;

use crate::domain::entity::analytics::{RevenueBucket, YearMonth};
use crate::domain::entity::dashboard::{
    ContentStats, DashboardStats, InvoiceStats, ProjectStats, TicketStats, UserStats,
};
use crate::domain::repository::StatsRepository;
use crate::error::AdminResult;

#[derive(Clone, Default)]
pub struct InMemoryStatsRepository {
    pub users: InMemoryUserRepository,
    pub cms: InMemoryCmsRepository,
    pub billing: InMemoryBillingRepository,
    pub portal: InMemoryPortalRepository,
}

impl InMemoryStatsRepository {
    pub fn new(
        users: InMemoryUserRepository,
        cms: InMemoryCmsRepository,
        billing: InMemoryBillingRepository,
        portal: InMemoryPortalRepository,
    ) -> Self {
        Self {
            users,
            cms,
            billing,
            portal,
        }
    }
}

fn tally<T>(items: impl IntoIterator<Item = T>, key: impl Fn(&T) -> &'static str) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for item in items {
        *counts.entry(key(&item)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, n)| (status.to_string(), n))
        .collect()
}

impl StatsRepository for InMemoryStatsRepository {
    async fn dashboard_stats(&self) -> AdminResult<DashboardStats> {
        let users = self.users.snapshot().await;
        let projects = self.portal.projects().await;
        let invoices = self.billing.invoices().await;
        let tickets = self.portal.tickets().await;

        let sum = |pred: fn(&InvoiceStatus) -> bool| -> i64 {
            invoices
                .iter()
                .filter(|i| pred(&i.status))
                .map(|i| i.amount)
                .sum()
        };

        Ok(DashboardStats {
            users: UserStats {
                total: users.len() as u64,
                clients: users.iter().filter(|u| !u.role.is_admin()).count() as u64,
                admins: users.iter().filter(|u| u.role.is_admin()).count() as u64,
            },
            projects: ProjectStats {
                total: projects.len() as u64,
                active: projects.iter().filter(|p| p.status.is_active()).count() as u64,
                completed: projects
                    .iter()
                    .filter(|p| p.status == ProjectStatus::Completed)
                    .count() as u64,
            },
            invoices: InvoiceStats {
                total: invoices.len() as u64,
                outstanding: invoices.iter().filter(|i| i.status.is_outstanding()).count() as u64,
                outstanding_amount: sum(InvoiceStatus::is_outstanding),
                paid_revenue: sum(|s| *s == InvoiceStatus::Paid),
            },
            tickets: TicketStats {
                total: tickets.len() as u64,
                open: tickets.iter().filter(|t| t.status.is_open()).count() as u64,
            },
            content: ContentStats {
                pages: self.cms.pages().await.len() as u64,
                published_posts: self
                    .cms
                    .posts()
                    .await
                    .iter()
                    .filter(|p| p.status == PostStatus::Published)
                    .count() as u64,
                templates: self.cms.templates().await.len() as u64,
            },
        })
    }

    async fn paid_revenue_since(&self, since: DateTime<Utc>) -> AdminResult<Vec<RevenueBucket>> {
        let mut buckets: BTreeMap<YearMonth, RevenueBucket> = BTreeMap::new();
        for invoice in self.billing.invoices().await {
            let Some(paid_at) = invoice.paid_at.filter(|_| invoice.status == InvoiceStatus::Paid)
            else {
                continue;
            };
            if paid_at < since {
                continue;
            }
            let month = YearMonth::of(paid_at);
            let bucket = buckets.entry(month).or_insert(RevenueBucket {
                month,
                revenue: 0,
                invoices: 0,
            });
            bucket.revenue += invoice.amount;
            bucket.invoices += 1;
        }
        Ok(buckets.into_values().collect())
    }

    async fn project_status_counts(&self) -> AdminResult<Vec<(String, u64)>> {
        Ok(tally(self.portal.projects().await, |p| p.status.code()))
    }

    async fn ticket_status_counts(&self) -> AdminResult<Vec<(String, u64)>> {
        Ok(tally(self.portal.tickets().await, |t| t.status.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing::Invoice;
    use chrono::TimeZone;
    use kernel::id::UserId;

    fn paid_invoice(amount: i64, paid_at: DateTime<Utc>) -> Invoice {
        let mut invoice =
            Invoice::new(UserId::new(), None, "Website", amount, None, None).unwrap();
        invoice.status = InvoiceStatus::Paid;
        invoice.paid_at = Some(paid_at);
        invoice
    }

    #[tokio::test]
    async fn test_revenue_groups_by_paid_month() {
        use billing::InvoiceRepository;

        let stats = InMemoryStatsRepository::default();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 3, 9, 0, 0).unwrap();
        let old = Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap();
        for invoice in [
            paid_invoice(100, jan),
            paid_invoice(250, jan),
            paid_invoice(400, feb),
            paid_invoice(999, old),
        ] {
            stats.billing.create(&invoice).await.unwrap();
        }

        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let buckets = stats.paid_revenue_since(since).await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].month, YearMonth { year: 2024, month: 1 });
        assert_eq!(buckets[0].revenue, 350);
        assert_eq!(buckets[0].invoices, 2);
        assert_eq!(buckets[1].revenue, 400);
    }
}
