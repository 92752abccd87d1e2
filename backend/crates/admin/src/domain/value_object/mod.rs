//! Value Object Module

pub mod analytics_months;
