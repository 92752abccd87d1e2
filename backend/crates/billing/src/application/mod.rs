//! Application Layer
//!
//! Use cases for pricing plans and invoices.

pub mod invoices;
pub mod listing;
pub mod plans;

// Re-exports
pub use invoices::{CreateInvoiceInput, InvoiceService};
pub use plans::{CreatePlanInput, PricingPlanService, UpdatePlanInput};
