//! Repository Traits

use kernel::id::{InvoiceId, PricingPlanId, UserId};
use kernel::pagination::ListParams;

use crate::domain::entity::{invoice::Invoice, pricing_plan::PricingPlan};
use crate::domain::value_object::invoice_status::InvoiceStatus;
use crate::error::BillingResult;

#[trait_variant::make(PricingPlanRepository: Send)]
pub trait LocalPricingPlanRepository {
    /// Fails with `SlugTaken` on a duplicate slug
    async fn create(&self, plan: &PricingPlan) -> BillingResult<()>;

    async fn update(&self, plan: &PricingPlan) -> BillingResult<bool>;

    async fn find_by_id(&self, id: PricingPlanId) -> BillingResult<Option<PricingPlan>>;

    async fn find_by_slug(&self, slug: &str) -> BillingResult<Option<PricingPlan>>;

    async fn list(&self, params: &ListParams) -> BillingResult<(Vec<PricingPlan>, u64)>;

    /// Active plans ordered by `sort_order`, then name
    async fn list_active(&self) -> BillingResult<Vec<PricingPlan>>;

    async fn delete(&self, id: PricingPlanId) -> BillingResult<bool>;
}

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<UserId>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status.is_none_or(|s| invoice.status == s)
            && self.client_id.is_none_or(|c| invoice.client_id == c)
    }
}

#[trait_variant::make(InvoiceRepository: Send)]
pub trait LocalInvoiceRepository {
    /// Fails with `NumberTaken` on a duplicate invoice number
    async fn create(&self, invoice: &Invoice) -> BillingResult<()>;

    /// Persist status, `paid_at` and `updated_at` if the stored status is
    /// still `from`. `false` if missing or already changed.
    async fn update_status(&self, invoice: &Invoice, from: InvoiceStatus) -> BillingResult<bool>;

    async fn find_by_id(&self, id: InvoiceId) -> BillingResult<Option<Invoice>>;

    async fn list(
        &self,
        filter: &InvoiceFilter,
        params: &ListParams,
    ) -> BillingResult<(Vec<Invoice>, u64)>;

    async fn delete(&self, id: InvoiceId) -> BillingResult<bool>;
}
