//! Billing Backend Module
//!
//! Pricing plans shown on the public site and client invoices.
//!
//! - `domain/` - Plans, invoices, the invoice status machine
//! - `application/` - Use cases and listing configurations
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Invoice numbers look like `INV-202405-7KQ2XM` and are unique. Status
//! changes follow `draft -> sent -> paid`, with `overdue` and `cancelled`
//! branches; only drafts can be deleted.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{InvoiceService, PricingPlanService};
pub use domain::{
    BillingPeriod, Invoice, InvoiceFilter, InvoiceNumber, InvoiceRepository, InvoiceStatus,
    PricingPlan, PricingPlanRepository,
};
pub use error::{BillingError, BillingResult};
pub use infra::{memory::InMemoryBillingRepository, postgres::PgBillingRepository};
pub use presentation::router::{
    billing_admin_router, billing_admin_router_generic, billing_portal_router,
    billing_portal_router_generic, billing_public_router, billing_public_router_generic,
};
