//! In-memory portal store for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{ProjectId, TicketId};
use kernel::pagination::ListParams;
use tokio::sync::RwLock;

use crate::domain::entity::{project::Project, ticket::Ticket};
use crate::domain::repository::{ProjectFilter, ProjectRepository, TicketFilter, TicketRepository};
use crate::domain::value_object::ticket_status::TicketStatus;
use crate::error::PortalResult;

#[derive(Clone, Default)]
pub struct InMemoryPortalRepository {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl InMemoryPortalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.projects.read().await.values().cloned().collect()
    }

    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.values().cloned().collect()
    }
}

impl ProjectRepository for InMemoryPortalRepository {
    async fn create(&self, project: &Project) -> PortalResult<()> {
        self.projects
            .write()
            .await
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> PortalResult<bool> {
        let mut projects = self.projects.write().await;
        Ok(match projects.get_mut(&project.id) {
            Some(existing) => {
                *existing = project.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: ProjectId) -> PortalResult<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ProjectFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Project>, u64)> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .filter(|p| params.search.as_ref().is_none_or(|s| s.matches(*p)))
            .cloned()
            .collect();

        projects.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "name" => a.name.cmp(&b.name),
                "progress" => a.progress.cmp(&b.progress),
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(projects))
    }

    async fn delete(&self, id: ProjectId) -> PortalResult<bool> {
        let removed = self.projects.write().await.remove(&id).is_some();
        if removed {
            // ON DELETE SET NULL
            for ticket in self.tickets.write().await.values_mut() {
                if ticket.project_id == Some(id) {
                    ticket.project_id = None;
                }
            }
        }
        Ok(removed)
    }
}

impl TicketRepository for InMemoryPortalRepository {
    async fn create(&self, ticket: &Ticket) -> PortalResult<()> {
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn update_status(&self, ticket: &Ticket, from: TicketStatus) -> PortalResult<bool> {
        let mut tickets = self.tickets.write().await;
        Ok(match tickets.get_mut(&ticket.id) {
            Some(existing) if existing.status == from => {
                existing.status = ticket.status;
                existing.updated_at = ticket.updated_at;
                true
            }
            _ => false,
        })
    }

    async fn find_by_id(&self, id: TicketId) -> PortalResult<Option<Ticket>> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &TicketFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Ticket>, u64)> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .read()
            .await
            .values()
            .filter(|t| filter.matches(t))
            .filter(|t| params.search.as_ref().is_none_or(|s| s.matches(*t)))
            .cloned()
            .collect();

        tickets.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "priority_rank" => a.priority.cmp(&b.priority),
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(tickets))
    }
}
