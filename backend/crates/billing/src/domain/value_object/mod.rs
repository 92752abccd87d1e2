//! Value Object Module

pub mod billing_period;
pub mod invoice_number;
pub mod invoice_status;
