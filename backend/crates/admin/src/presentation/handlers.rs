//! HTTP Handlers

use auth::{CurrentUser, UserRepository, UserRole};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::UserId;
use kernel::pagination::{Paginated, RawListQuery};
use std::sync::Arc;

use crate::application::listing::USER_LISTING;
use crate::application::{AnalyticsOverview, AnalyticsService, DashboardService, UserAdminService};
use crate::domain::entity::analytics::{MonthlyRevenue, StatusCount};
use crate::domain::entity::dashboard::DashboardStats;
use crate::domain::repository::StatsRepository;
use crate::domain::value_object::analytics_months::AnalyticsMonths;
use crate::error::AdminResult;
use crate::presentation::dto::{AnalyticsQuery, UpdateRoleRequest, UserResponse};

/// Shared state for admin handlers
#[derive(Clone)]
pub struct AdminAppState<U, S>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub stats: Arc<S>,
}

/// GET /api/admin/dashboard
pub async fn dashboard<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
) -> AdminResult<Json<DashboardStats>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let stats = DashboardService::new(state.stats.clone())
        .stats(&current)
        .await?;
    Ok(Json(stats))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/admin/users
pub async fn list_users<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
    Query(query): Query<RawListQuery>,
) -> AdminResult<Json<Paginated<UserResponse>>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let params = query.validate(&USER_LISTING)?;
    let (users, total) = UserAdminService::new(state.users.clone())
        .list(&current, &params)
        .await?;
    Ok(Json(Paginated::new(users, total, &params).map(UserResponse::from)))
}

/// PATCH /api/admin/users/{id}/role
pub async fn update_user_role<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateRoleRequest>,
) -> AdminResult<Json<UserResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let role: UserRole = req.role.parse()?;
    let user = UserAdminService::new(state.users.clone())
        .update_role(&current, id, role)
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
    Path(id): Path<UserId>,
) -> AdminResult<StatusCode>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    UserAdminService::new(state.users.clone())
        .delete(&current, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/admin/analytics?months=
pub async fn analytics_overview<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> AdminResult<Json<AnalyticsOverview>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let months = AnalyticsMonths::parse(query.months.as_deref())?;
    let overview = AnalyticsService::new(state.stats.clone())
        .overview(&current, months)
        .await?;
    Ok(Json(overview))
}

/// GET /api/admin/analytics/revenue?months=
pub async fn revenue<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> AdminResult<Json<Vec<MonthlyRevenue>>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let months = AnalyticsMonths::parse(query.months.as_deref())?;
    let series = AnalyticsService::new(state.stats.clone())
        .monthly_revenue(&current, months)
        .await?;
    Ok(Json(series))
}

/// GET /api/admin/analytics/projects
pub async fn project_distribution<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
) -> AdminResult<Json<Vec<StatusCount>>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let dist = AnalyticsService::new(state.stats.clone())
        .project_distribution(&current)
        .await?;
    Ok(Json(dist))
}

/// GET /api/admin/analytics/tickets
pub async fn ticket_distribution<U, S>(
    State(state): State<AdminAppState<U, S>>,
    current: CurrentUser,
) -> AdminResult<Json<Vec<StatusCount>>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: StatsRepository + Clone + Send + Sync + 'static,
{
    let dist = AnalyticsService::new(state.stats.clone())
        .ticket_distribution(&current)
        .await?;
    Ok(Json(dist))
}
