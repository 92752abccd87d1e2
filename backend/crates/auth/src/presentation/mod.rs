//! Presentation Layer
//!
//! HTTP handlers, DTOs, middleware, extractors and router.

pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod middleware;
pub mod router;
