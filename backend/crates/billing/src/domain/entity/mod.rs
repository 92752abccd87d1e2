//! Entity Module

pub mod invoice;
pub mod pricing_plan;
