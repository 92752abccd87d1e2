//! Value Object Module

pub mod project_status;
pub mod ticket_priority;
pub mod ticket_status;
