//! Pricing Plan Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::PricingPlanId;
use kernel::pagination::Searchable;
use kernel::slug::Slug;

use crate::domain::value_object::billing_period::BillingPeriod;

pub const NAME_MAX_LENGTH: usize = 100;
pub const MAX_FEATURES: usize = 50;

#[derive(Debug, Clone)]
pub struct PricingPlan {
    pub id: PricingPlanId,
    pub name: String,
    /// Unique
    pub slug: Slug,
    pub description: Option<String>,
    /// Whole rupiah
    pub price: i64,
    pub billing_period: BillingPeriod,
    pub features: Vec<String>,
    pub is_popular: bool,
    /// Inactive plans are hidden from the public catalog
    pub is_active: bool,
    /// Ascending display order
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingPlan {
    pub fn new(name: &str, slug: Slug, price: i64, billing_period: BillingPeriod) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: PricingPlanId::new(),
            name: Self::validate_name(name)?,
            slug,
            description: None,
            price: Self::validate_price(price)?,
            billing_period,
            features: Vec::new(),
            is_popular: false,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_name(raw: &str) -> AppResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name cannot be empty"));
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {} characters",
                NAME_MAX_LENGTH
            )));
        }
        Ok(name.to_string())
    }

    pub fn validate_price(price: i64) -> AppResult<i64> {
        if price < 0 {
            return Err(AppError::bad_request("Price must be greater than or equal to 0"));
        }
        Ok(price)
    }

    /// Trimmed, blank entries dropped
    pub fn set_features(&mut self, features: Vec<String>) -> AppResult<()> {
        let features: Vec<String> = features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if features.len() > MAX_FEATURES {
            return Err(AppError::bad_request(format!(
                "A plan can list at most {} features",
                MAX_FEATURES
            )));
        }
        self.features = features;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Searchable for PricingPlan {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_must_not_be_negative() {
        let slug = Slug::new("basic").unwrap();
        assert!(PricingPlan::new("Basic", slug.clone(), -1, BillingPeriod::OneTime).is_err());
        let plan = PricingPlan::new("Basic", slug, 0, BillingPeriod::OneTime).unwrap();
        assert_eq!(plan.price, 0);
        assert!(plan.is_active);
    }

    #[test]
    fn test_features_are_cleaned() {
        let mut plan =
            PricingPlan::new("Pro", Slug::new("pro").unwrap(), 1_500_000, BillingPeriod::Monthly)
                .unwrap();
        plan.set_features(vec![" SSL ".into(), "".into(), "Hosting".into()])
            .unwrap();
        assert_eq!(plan.features, vec!["SSL", "Hosting"]);
        assert!(plan.set_features(vec!["x".into(); 51]).is_err());
    }
}
