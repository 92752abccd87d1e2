//! Repository Traits

use kernel::id::{ProjectId, TicketId, UserId};
use kernel::pagination::ListParams;

use crate::domain::entity::{project::Project, ticket::Ticket};
use crate::domain::value_object::{project_status::ProjectStatus, ticket_status::TicketStatus};
use crate::error::PortalResult;

/// Listing filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub client_id: Option<UserId>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        self.status.is_none_or(|s| project.status == s)
            && self.client_id.is_none_or(|c| project.client_id == c)
    }
}

#[trait_variant::make(ProjectRepository: Send)]
pub trait LocalProjectRepository {
    async fn create(&self, project: &Project) -> PortalResult<()>;

    async fn update(&self, project: &Project) -> PortalResult<bool>;

    async fn find_by_id(&self, id: ProjectId) -> PortalResult<Option<Project>>;

    async fn list(
        &self,
        filter: &ProjectFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Project>, u64)>;

    async fn delete(&self, id: ProjectId) -> PortalResult<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub client_id: Option<UserId>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|s| ticket.status == s)
            && self.client_id.is_none_or(|c| ticket.client_id == c)
    }
}

#[trait_variant::make(TicketRepository: Send)]
pub trait LocalTicketRepository {
    async fn create(&self, ticket: &Ticket) -> PortalResult<()>;

    /// Persist status and `updated_at` if the stored status is still `from`.
    /// `false` if missing or already changed.
    async fn update_status(&self, ticket: &Ticket, from: TicketStatus) -> PortalResult<bool>;

    async fn find_by_id(&self, id: TicketId) -> PortalResult<Option<Ticket>>;

    async fn list(
        &self,
        filter: &TicketFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Ticket>, u64)>;
}
