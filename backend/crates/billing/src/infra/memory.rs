//! In-memory billing store for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{InvoiceId, PricingPlanId};
use kernel::pagination::ListParams;
use tokio::sync::RwLock;

use crate::domain::entity::{invoice::Invoice, pricing_plan::PricingPlan};
use crate::domain::repository::{InvoiceFilter, InvoiceRepository, PricingPlanRepository};
use crate::domain::value_object::invoice_status::InvoiceStatus;
use crate::error::{BillingError, BillingResult};

#[derive(Clone, Default)]
pub struct InMemoryBillingRepository {
    plans: Arc<RwLock<HashMap<PricingPlanId, PricingPlan>>>,
    invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
}

impl InMemoryBillingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().await.values().cloned().collect()
    }
}

impl PricingPlanRepository for InMemoryBillingRepository {
    async fn create(&self, plan: &PricingPlan) -> BillingResult<()> {
        let mut plans = self.plans.write().await;
        if plans.values().any(|p| p.slug == plan.slug) {
            return Err(BillingError::SlugTaken(plan.slug.to_string()));
        }
        plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &PricingPlan) -> BillingResult<bool> {
        let mut plans = self.plans.write().await;
        if plans.values().any(|p| p.slug == plan.slug && p.id != plan.id) {
            return Err(BillingError::SlugTaken(plan.slug.to_string()));
        }
        Ok(match plans.get_mut(&plan.id) {
            Some(existing) => {
                *existing = plan.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: PricingPlanId) -> BillingResult<Option<PricingPlan>> {
        Ok(self.plans.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> BillingResult<Option<PricingPlan>> {
        Ok(self
            .plans
            .read()
            .await
            .values()
            .find(|p| p.slug.as_str() == slug)
            .cloned())
    }

    async fn list(&self, params: &ListParams) -> BillingResult<(Vec<PricingPlan>, u64)> {
        let mut plans: Vec<PricingPlan> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| params.search.as_ref().is_none_or(|s| s.matches(*p)))
            .cloned()
            .collect();

        plans.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "name" => a.name.cmp(&b.name),
                "price" => a.price.cmp(&b.price),
                "created_at" => a.created_at.cmp(&b.created_at),
                _ => a.sort_order.cmp(&b.sort_order),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(plans))
    }

    async fn list_active(&self) -> BillingResult<Vec<PricingPlan>> {
        let mut plans: Vec<PricingPlan> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(plans)
    }

    async fn delete(&self, id: PricingPlanId) -> BillingResult<bool> {
        Ok(self.plans.write().await.remove(&id).is_some())
    }
}

impl InvoiceRepository for InMemoryBillingRepository {
    async fn create(&self, invoice: &Invoice) -> BillingResult<()> {
        let mut invoices = self.invoices.write().await;
        if invoices.values().any(|i| i.number == invoice.number) {
            return Err(BillingError::NumberTaken(invoice.number.to_string()));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn update_status(&self, invoice: &Invoice, from: InvoiceStatus) -> BillingResult<bool> {
        let mut invoices = self.invoices.write().await;
        Ok(match invoices.get_mut(&invoice.id) {
            Some(existing) if existing.status == from => {
                existing.status = invoice.status;
                existing.paid_at = invoice.paid_at;
                existing.updated_at = invoice.updated_at;
                true
            }
            _ => false,
        })
    }

    async fn find_by_id(&self, id: InvoiceId) -> BillingResult<Option<Invoice>> {
        Ok(self.invoices.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &InvoiceFilter,
        params: &ListParams,
    ) -> BillingResult<(Vec<Invoice>, u64)> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .read()
            .await
            .values()
            .filter(|i| filter.matches(i))
            .filter(|i| params.search.as_ref().is_none_or(|s| s.matches(*i)))
            .cloned()
            .collect();

        invoices.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "amount" => a.amount.cmp(&b.amount),
                "due_date" => a.due_date.cmp(&b.due_date),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(invoices))
    }

    async fn delete(&self, id: InvoiceId) -> BillingResult<bool> {
        let mut invoices = self.invoices.write().await;
        let draft = invoices
            .get(&id)
            .is_some_and(|i| i.status == InvoiceStatus::Draft);
        Ok(draft && invoices.remove(&id).is_some())
    }
}
