//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every JasaWeb crate agrees on:
//! - the unified error type and its HTTP mapping
//! - typed UUID identifiers
//! - the pagination/query service used by every listing endpoint
//! - URL slugs

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod pagination;
pub mod slug;
