//! Dashboard statistics

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub clients: u64,
    pub admins: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: u64,
    /// `in_progress` or `review`
    pub active: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStats {
    pub total: u64,
    /// `sent` or `overdue`
    pub outstanding: u64,
    pub outstanding_amount: i64,
    pub paid_revenue: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    /// `open` or `in_progress`
    pub open: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub pages: u64,
    pub published_posts: u64,
    pub templates: u64,
}

/// Everything the admin dashboard shows on one screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub users: UserStats,
    pub projects: ProjectStats,
    pub invoices: InvoiceStats,
    pub tickets: TicketStats,
    pub content: ContentStats,
}
