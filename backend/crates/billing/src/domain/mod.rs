//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{invoice::Invoice, pricing_plan::PricingPlan};
pub use repository::{InvoiceFilter, InvoiceRepository, PricingPlanRepository};
pub use value_object::{
    billing_period::BillingPeriod, invoice_number::InvoiceNumber, invoice_status::InvoiceStatus,
};
