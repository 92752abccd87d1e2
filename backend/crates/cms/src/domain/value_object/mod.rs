//! Value Object Module

pub mod post_status;
