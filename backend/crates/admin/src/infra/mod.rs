//! Infrastructure Layer
//!
//! Aggregate query implementations.

pub mod memory;
pub mod postgres;
