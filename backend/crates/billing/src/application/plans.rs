//! Pricing plan use cases

use std::sync::Arc;

use kernel::id::PricingPlanId;
use kernel::pagination::ListParams;
use kernel::slug::Slug;

use crate::domain::entity::pricing_plan::PricingPlan;
use crate::domain::repository::PricingPlanRepository;
use crate::domain::value_object::billing_period::BillingPeriod;
use crate::error::{BillingError, BillingResult};

pub struct CreatePlanInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub billing_period: BillingPeriod,
    pub features: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Default)]
pub struct UpdatePlanInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub billing_period: Option<BillingPeriod>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

pub struct PricingPlanService<R>
where
    R: PricingPlanRepository,
{
    repo: Arc<R>,
}

impl<R> PricingPlanService<R>
where
    R: PricingPlanRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Public catalog
    pub async fn list_active(&self) -> BillingResult<Vec<PricingPlan>> {
        self.repo.list_active().await
    }

    pub async fn list(&self, params: &ListParams) -> BillingResult<(Vec<PricingPlan>, u64)> {
        self.repo.list(params).await
    }

    pub async fn get(&self, id: PricingPlanId) -> BillingResult<PricingPlan> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BillingError::PlanNotFound)
    }

    pub async fn create(&self, input: CreatePlanInput) -> BillingResult<PricingPlan> {
        let slug = Slug::resolve(input.slug.as_deref(), &input.name)?;
        let mut plan = PricingPlan::new(&input.name, slug, input.price, input.billing_period)?;
        plan.description = input.description.filter(|d| !d.trim().is_empty());
        plan.set_features(input.features)?;
        plan.is_popular = input.is_popular;
        plan.is_active = input.is_active;
        plan.sort_order = input.sort_order;

        self.ensure_slug_free(&plan.slug, None).await?;
        self.repo.create(&plan).await?;

        tracing::info!(plan_id = %plan.id, slug = %plan.slug, price = plan.price, "Pricing plan created");
        Ok(plan)
    }

    pub async fn update(
        &self,
        id: PricingPlanId,
        input: UpdatePlanInput,
    ) -> BillingResult<PricingPlan> {
        let mut plan = self.get(id).await?;

        if let Some(name) = input.name.as_deref() {
            plan.name = PricingPlan::validate_name(name)?;
        }
        if let Some(raw) = input.slug.as_deref() {
            let slug = Slug::new(raw)?;
            self.ensure_slug_free(&slug, Some(id)).await?;
            plan.slug = slug;
        }
        if let Some(description) = input.description {
            plan.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(price) = input.price {
            plan.price = PricingPlan::validate_price(price)?;
        }
        if let Some(period) = input.billing_period {
            plan.billing_period = period;
        }
        if let Some(features) = input.features {
            plan.set_features(features)?;
        }
        if let Some(is_popular) = input.is_popular {
            plan.is_popular = is_popular;
        }
        if let Some(is_active) = input.is_active {
            plan.is_active = is_active;
        }
        if let Some(sort_order) = input.sort_order {
            plan.sort_order = sort_order;
        }
        plan.touch();

        if !self.repo.update(&plan).await? {
            return Err(BillingError::PlanNotFound);
        }
        tracing::info!(plan_id = %plan.id, "Pricing plan updated");
        Ok(plan)
    }

    pub async fn delete(&self, id: PricingPlanId) -> BillingResult<()> {
        if !self.repo.delete(id).await? {
            return Err(BillingError::PlanNotFound);
        }
        tracing::info!(plan_id = %id, "Pricing plan deleted");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &Slug, owner: Option<PricingPlanId>) -> BillingResult<()> {
        match self.repo.find_by_slug(slug.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(BillingError::SlugTaken(slug.to_string()))
            }
            _ => Ok(()),
        }
    }
}
