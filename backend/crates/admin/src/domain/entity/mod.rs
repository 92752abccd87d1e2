//! Entity Module

pub mod analytics;
pub mod dashboard;
