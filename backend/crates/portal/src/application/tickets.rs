//! Support ticket use cases
//!
//! Clients open tickets and follow their own; admins triage all of them.

use std::sync::Arc;

use auth::{Action, CurrentUser, Resource, require};
use chrono::Utc;
use kernel::id::{ProjectId, TicketId};
use kernel::pagination::ListParams;

use crate::domain::entity::ticket::Ticket;
use crate::domain::repository::{ProjectRepository, TicketFilter, TicketRepository};
use crate::domain::value_object::{ticket_priority::TicketPriority, ticket_status::TicketStatus};
use crate::error::{PortalError, PortalResult};

pub struct CreateTicketInput {
    pub project_id: Option<ProjectId>,
    pub subject: String,
    pub message: String,
    pub priority: TicketPriority,
}

pub struct TicketService<R>
where
    R: TicketRepository + ProjectRepository,
{
    repo: Arc<R>,
}

impl<R> TicketService<R>
where
    R: TicketRepository + ProjectRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Open a ticket owned by `user`
    ///
    /// A referenced project must exist and be one the caller can read.
    pub async fn create(&self, user: &CurrentUser, input: CreateTicketInput) -> PortalResult<Ticket> {
        require(
            Some(user),
            Resource::Ticket {
                owner: Some(user.id),
            },
            Action::Create,
        )?;

        if let Some(project_id) = input.project_id {
            let project = ProjectRepository::find_by_id(&*self.repo, project_id)
                .await?
                .ok_or(PortalError::ProjectNotFound)?;
            require(
                Some(user),
                Resource::Project {
                    owner: Some(project.client_id),
                },
                Action::Read,
            )?;
        }

        let ticket = Ticket::new(
            user.id,
            input.project_id,
            &input.subject,
            &input.message,
            input.priority,
        )?;
        TicketRepository::create(&*self.repo, &ticket).await?;

        tracing::info!(
            ticket_id = %ticket.id,
            client_id = %ticket.client_id,
            priority = %ticket.priority,
            "Ticket opened"
        );
        Ok(ticket)
    }

    /// Every ticket; admins only
    pub async fn list(
        &self,
        user: &CurrentUser,
        filter: &TicketFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Ticket>, u64)> {
        require(Some(user), Resource::Ticket { owner: None }, Action::Read)?;
        TicketRepository::list(&*self.repo, filter, params).await
    }

    pub async fn list_for(
        &self,
        user: &CurrentUser,
        status: Option<TicketStatus>,
        params: &ListParams,
    ) -> PortalResult<(Vec<Ticket>, u64)> {
        let filter = TicketFilter {
            status,
            client_id: Some(user.id),
        };
        require(
            Some(user),
            Resource::Ticket {
                owner: filter.client_id,
            },
            Action::Read,
        )?;
        TicketRepository::list(&*self.repo, &filter, params).await
    }

    pub async fn get(&self, id: TicketId) -> PortalResult<Ticket> {
        TicketRepository::find_by_id(&*self.repo, id)
            .await?
            .ok_or(PortalError::TicketNotFound)
    }

    pub async fn update_status(
        &self,
        user: &CurrentUser,
        id: TicketId,
        status: TicketStatus,
    ) -> PortalResult<Ticket> {
        let mut ticket = self.get(id).await?;
        require(
            Some(user),
            Resource::Ticket {
                owner: Some(ticket.client_id),
            },
            Action::Update,
        )?;

        let from = ticket.status;
        ticket.set_status(status, Utc::now())?;
        if !self.repo.update_status(&ticket, from).await? {
            let current = self.get(id).await?.status;
            tracing::warn!(
                ticket_id = %id,
                %from,
                %current,
                to = %status,
                "Ticket status changed concurrently"
            );
            return Err(PortalError::StatusChanged { current });
        }
        tracing::info!(ticket_id = %ticket.id, %from, to = %status, "Ticket status changed");
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::UserRole;
    use kernel::error::app_error::AppError;
    use kernel::id::UserId;

    use crate::domain::entity::project::Project;
    use crate::domain::repository::ProjectFilter;
    use crate::infra::memory::InMemoryPortalRepository;

    /// Serves one fixed ticket snapshot, as a request that read the row
    /// before another one wrote it would see it.
    struct StaleReads {
        inner: InMemoryPortalRepository,
        snapshot: Ticket,
    }

    impl TicketRepository for StaleReads {
        async fn create(&self, ticket: &Ticket) -> PortalResult<()> {
            TicketRepository::create(&self.inner, ticket).await
        }

        async fn update_status(&self, ticket: &Ticket, from: TicketStatus) -> PortalResult<bool> {
            self.inner.update_status(ticket, from).await
        }

        async fn find_by_id(&self, id: TicketId) -> PortalResult<Option<Ticket>> {
            if id == self.snapshot.id {
                return Ok(Some(self.snapshot.clone()));
            }
            TicketRepository::find_by_id(&self.inner, id).await
        }

        async fn list(
            &self,
            filter: &TicketFilter,
            params: &ListParams,
        ) -> PortalResult<(Vec<Ticket>, u64)> {
            TicketRepository::list(&self.inner, filter, params).await
        }
    }

    impl ProjectRepository for StaleReads {
        async fn create(&self, project: &Project) -> PortalResult<()> {
            ProjectRepository::create(&self.inner, project).await
        }

        async fn update(&self, project: &Project) -> PortalResult<bool> {
            self.inner.update(project).await
        }

        async fn find_by_id(&self, id: ProjectId) -> PortalResult<Option<Project>> {
            ProjectRepository::find_by_id(&self.inner, id).await
        }

        async fn list(
            &self,
            filter: &ProjectFilter,
            params: &ListParams,
        ) -> PortalResult<(Vec<Project>, u64)> {
            ProjectRepository::list(&self.inner, filter, params).await
        }

        async fn delete(&self, id: ProjectId) -> PortalResult<bool> {
            self.inner.delete(id).await
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: UserId::new(),
            email: "admin@example.com".to_string(),
            role: UserRole::Admin,
        }
    }

    #[tokio::test]
    async fn test_closed_ticket_is_not_reopened_by_a_stale_update() {
        let repo = InMemoryPortalRepository::new();
        let ticket = Ticket::new(
            UserId::new(),
            None,
            "Broken contact form",
            "Submissions bounce",
            TicketPriority::High,
        )
        .unwrap();
        TicketRepository::create(&repo, &ticket).await.unwrap();
        let admin = admin();

        let closer = TicketService::new(Arc::new(repo.clone()));
        closer
            .update_status(&admin, ticket.id, TicketStatus::Closed)
            .await
            .unwrap();

        // Read the ticket while it was still open
        let stale = TicketService::new(Arc::new(StaleReads {
            inner: repo.clone(),
            snapshot: ticket.clone(),
        }));
        let err = stale
            .update_status(&admin, ticket.id, TicketStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::StatusChanged { .. }));
        assert_eq!(AppError::from(err).status_code(), 409);

        let stored = TicketRepository::find_by_id(&repo, ticket.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TicketStatus::Closed);
    }
}
