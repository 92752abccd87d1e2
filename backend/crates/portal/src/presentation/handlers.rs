//! HTTP Handlers

use auth::{Action, CurrentUser, Resource, require};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::error::app_error::AppError;
use kernel::id::{ProjectId, TicketId, UserId};
use kernel::pagination::Paginated;
use std::str::FromStr;
use std::sync::Arc;

use crate::application::listing::{PROJECT_LISTING, TICKET_LISTING};
use crate::application::{
    CreateProjectInput, CreateTicketInput, ProjectService, TicketService, UpdateProjectInput,
};
use crate::domain::repository::{ProjectFilter, ProjectRepository, TicketFilter, TicketRepository};
use crate::domain::value_object::{
    project_status::ProjectStatus, ticket_priority::TicketPriority, ticket_status::TicketStatus,
};
use crate::error::PortalResult;
use crate::presentation::dto::{
    CreateProjectRequest, CreateTicketRequest, PortalListQuery, ProjectResponse,
    TicketResponse, UpdateProjectRequest, UpdateTicketStatusRequest,
};

/// Shared state for portal handlers
#[derive(Clone)]
pub struct PortalAppState<R>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

/// Parse an optional enum query parameter, 400 on unknown values
fn parse_opt<T>(raw: Option<&str>) -> PortalResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    Ok(raw.map(str::parse::<T>).transpose()?)
}

fn parse_client_id(raw: Option<&str>) -> PortalResult<Option<UserId>> {
    Ok(raw
        .map(|v| v.trim().parse::<UserId>().map_err(AppError::from))
        .transpose()?)
}

// ============================================================================
// Admin: projects
// ============================================================================

/// GET /api/admin/projects
pub async fn list_projects<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Query(query): Query<PortalListQuery>,
) -> PortalResult<Json<Paginated<ProjectResponse>>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Project { owner: None }, Action::Read)?;
    let filter = ProjectFilter {
        status: parse_opt(query.status.as_deref())?,
        client_id: parse_client_id(query.client_id.as_deref())?,
    };
    let params = query.list.validate(&PROJECT_LISTING)?;
    let (projects, total) = ProjectService::new(state.repo.clone())
        .list(&filter, &params)
        .await?;
    Ok(Json(
        Paginated::new(projects, total, &params).map(ProjectResponse::from),
    ))
}

/// GET /api/admin/projects/{id} and /api/portal/projects/{id}
pub async fn get_project<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> PortalResult<Json<ProjectResponse>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let project = ProjectService::new(state.repo.clone())
        .get_for(&current, id)
        .await?;
    Ok(Json(project.into()))
}

/// POST /api/admin/projects
pub async fn create_project<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreateProjectRequest>,
) -> PortalResult<(StatusCode, Json<ProjectResponse>)>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    require(
        Some(&current),
        Resource::Project {
            owner: Some(req.client_id),
        },
        Action::Create,
    )?;
    let project = ProjectService::new(state.repo.clone())
        .create(CreateProjectInput {
            status: parse_opt::<ProjectStatus>(req.status.as_deref())?.unwrap_or_default(),
            client_id: req.client_id,
            name: req.name,
            description: req.description,
            progress: req.progress,
            budget: req.budget,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

/// PUT /api/admin/projects/{id}
pub async fn update_project<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
    Json(req): Json<UpdateProjectRequest>,
) -> PortalResult<Json<ProjectResponse>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Project { owner: None }, Action::Update)?;
    let project = ProjectService::new(state.repo.clone())
        .update(
            id,
            UpdateProjectInput {
                status: parse_opt(req.status.as_deref())?,
                name: req.name,
                description: req.description,
                progress: req.progress,
                budget: req.budget,
            },
        )
        .await?;
    Ok(Json(project.into()))
}

/// DELETE /api/admin/projects/{id}
pub async fn delete_project<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Path(id): Path<ProjectId>,
) -> PortalResult<StatusCode>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Project { owner: None }, Action::Delete)?;
    ProjectService::new(state.repo.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: tickets
// ============================================================================

/// GET /api/admin/tickets
pub async fn list_tickets<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Query(query): Query<PortalListQuery>,
) -> PortalResult<Json<Paginated<TicketResponse>>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let filter = TicketFilter {
        status: parse_opt(query.status.as_deref())?,
        client_id: parse_client_id(query.client_id.as_deref())?,
    };
    let params = query.list.validate(&TICKET_LISTING)?;
    let (tickets, total) = TicketService::new(state.repo.clone())
        .list(&current, &filter, &params)
        .await?;
    Ok(Json(
        Paginated::new(tickets, total, &params).map(TicketResponse::from),
    ))
}

/// GET /api/admin/tickets/{id} and /api/portal/tickets/{id}
pub async fn get_ticket<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Path(id): Path<TicketId>,
) -> PortalResult<Json<TicketResponse>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let ticket = TicketService::new(state.repo.clone()).get(id).await?;
    require(
        Some(&current),
        Resource::Ticket {
            owner: Some(ticket.client_id),
        },
        Action::Read,
    )?;
    Ok(Json(ticket.into()))
}

/// PATCH /api/admin/tickets/{id}/status
pub async fn update_ticket_status<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Path(id): Path<TicketId>,
    Json(req): Json<UpdateTicketStatusRequest>,
) -> PortalResult<Json<TicketResponse>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let status: TicketStatus = req.status.parse()?;
    let ticket = TicketService::new(state.repo.clone())
        .update_status(&current, id, status)
        .await?;
    Ok(Json(ticket.into()))
}

// ============================================================================
// Client portal
// ============================================================================

/// GET /api/portal/projects
pub async fn list_my_projects<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Query(query): Query<PortalListQuery>,
) -> PortalResult<Json<Paginated<ProjectResponse>>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let status = parse_opt::<ProjectStatus>(query.status.as_deref())?;
    let params = query.list.validate(&PROJECT_LISTING)?;
    let (projects, total) = ProjectService::new(state.repo.clone())
        .list_for(&current, status, &params)
        .await?;
    Ok(Json(
        Paginated::new(projects, total, &params).map(ProjectResponse::from),
    ))
}

/// GET /api/portal/tickets
pub async fn list_my_tickets<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Query(query): Query<PortalListQuery>,
) -> PortalResult<Json<Paginated<TicketResponse>>>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let status = parse_opt::<TicketStatus>(query.status.as_deref())?;
    let params = query.list.validate(&TICKET_LISTING)?;
    let (tickets, total) = TicketService::new(state.repo.clone())
        .list_for(&current, status, &params)
        .await?;
    Ok(Json(
        Paginated::new(tickets, total, &params).map(TicketResponse::from),
    ))
}

/// POST /api/portal/tickets
pub async fn create_ticket<R>(
    State(state): State<PortalAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreateTicketRequest>,
) -> PortalResult<(StatusCode, Json<TicketResponse>)>
where
    R: ProjectRepository + TicketRepository + Clone + Send + Sync + 'static,
{
    let ticket = TicketService::new(state.repo.clone())
        .create(
            &current,
            CreateTicketInput {
                priority: parse_opt::<TicketPriority>(req.priority.as_deref())?.unwrap_or_default(),
                project_id: req.project_id,
                subject: req.subject,
                message: req.message,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ticket.into())))
}
