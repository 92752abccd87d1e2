//! Entity Module

pub mod current_user;
pub mod user;
