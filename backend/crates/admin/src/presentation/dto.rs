//! API DTOs (Data Transfer Objects)

use serde::Deserialize;

pub use auth::presentation::dto::UserResponse;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// `?months=` for revenue analytics; kept as text so bad input is a 400
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub months: Option<String>,
}
