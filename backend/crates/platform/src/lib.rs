//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Environment configuration loading and validation
//! - Cookie building and parsing
//! - Client IP resolution
//! - Cryptographic helpers (random tokens, constant-time comparison)
//! - Password hashing (Argon2id)
//! - In-memory sliding-window rate limiting and its axum middleware

pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
