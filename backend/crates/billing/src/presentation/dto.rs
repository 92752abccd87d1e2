//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{InvoiceId, PricingPlanId, ProjectId, UserId};
use kernel::pagination::RawListQuery;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{invoice::Invoice, pricing_plan::PricingPlan};
use crate::domain::value_object::{billing_period::BillingPeriod, invoice_status::InvoiceStatus};

fn default_true() -> bool {
    true
}

// ============================================================================
// Pricing plans
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    /// Defaults to `one_time`
    pub billing_period: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub billing_period: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub id: PricingPlanId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub billing_period: BillingPeriod,
    pub features: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PricingPlan> for PlanResponse {
    fn from(plan: PricingPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            slug: plan.slug.as_str().to_string(),
            description: plan.description,
            price: plan.price,
            billing_period: plan.billing_period,
            features: plan.features,
            is_popular: plan.is_popular,
            is_active: plan.is_active,
            sort_order: plan.sort_order,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

// ============================================================================
// Invoices
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub description: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub number: String,
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub description: String,
    pub amount: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            number: invoice.number.as_str().to_string(),
            client_id: invoice.client_id,
            project_id: invoice.project_id,
            description: invoice.description,
            amount: invoice.amount,
            currency: invoice.currency,
            status: invoice.status,
            issued_at: invoice.issued_at,
            due_date: invoice.due_date,
            paid_at: invoice.paid_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// `?status=&clientId=` plus the usual listing parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub list: RawListQuery,
}
