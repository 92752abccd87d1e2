//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{ProjectId, TicketId, UserId};
use kernel::pagination::RawListQuery;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{project::Project, ticket::Ticket};
use crate::domain::value_object::{
    project_status::ProjectStatus, ticket_priority::TicketPriority, ticket_status::TicketStatus,
};

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub client_id: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `pending`
    pub status: Option<String>,
    #[serde(default)]
    pub progress: i64,
    pub budget: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i64>,
    pub budget: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub client_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub progress: u8,
    pub budget: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            client_id: project.client_id,
            name: project.name,
            description: project.description,
            status: project.status,
            progress: project.progress,
            budget: project.budget,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

// ============================================================================
// Tickets
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub project_id: Option<ProjectId>,
    pub subject: String,
    pub message: String,
    /// Defaults to `medium`
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTicketStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: TicketId,
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub subject: String,
    pub message: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            client_id: ticket.client_id,
            project_id: ticket.project_id,
            subject: ticket.subject,
            message: ticket.message,
            priority: ticket.priority,
            status: ticket.status,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

/// `?status=&clientId=` plus the usual listing parameters.
/// `clientId` is ignored on client routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalListQuery {
    pub status: Option<String>,
    pub client_id: Option<String>,
    #[serde(flatten)]
    pub list: RawListQuery,
}
