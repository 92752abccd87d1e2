//! Project use cases

use std::sync::Arc;

use auth::{Action, CurrentUser, Resource, require};
use kernel::id::{ProjectId, UserId};
use kernel::pagination::ListParams;

use crate::domain::entity::project::Project;
use crate::domain::repository::{ProjectFilter, ProjectRepository};
use crate::domain::value_object::project_status::ProjectStatus;
use crate::error::{PortalError, PortalResult};

pub struct CreateProjectInput {
    pub client_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub progress: i64,
    pub budget: Option<i64>,
}

#[derive(Default)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i64>,
    pub budget: Option<i64>,
}

pub struct ProjectService<R>
where
    R: ProjectRepository,
{
    repo: Arc<R>,
}

impl<R> ProjectService<R>
where
    R: ProjectRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filter: &ProjectFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Project>, u64)> {
        self.repo.list(filter, params).await
    }

    pub async fn list_for(
        &self,
        user: &CurrentUser,
        status: Option<ProjectStatus>,
        params: &ListParams,
    ) -> PortalResult<(Vec<Project>, u64)> {
        require(
            Some(user),
            Resource::Project {
                owner: Some(user.id),
            },
            Action::Read,
        )?;
        let filter = ProjectFilter {
            status,
            client_id: Some(user.id),
        };
        self.repo.list(&filter, params).await
    }

    pub async fn get(&self, id: ProjectId) -> PortalResult<Project> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PortalError::ProjectNotFound)
    }

    /// A project the caller may read
    pub async fn get_for(&self, user: &CurrentUser, id: ProjectId) -> PortalResult<Project> {
        let project = self.get(id).await?;
        require(
            Some(user),
            Resource::Project {
                owner: Some(project.client_id),
            },
            Action::Read,
        )?;
        Ok(project)
    }

    pub async fn create(&self, input: CreateProjectInput) -> PortalResult<Project> {
        let mut project = Project::new(input.client_id, &input.name)?;
        project.set_description(input.description)?;
        project.set_progress(input.progress)?;
        project.set_budget(input.budget)?;
        project.status = input.status;

        self.repo.create(&project).await?;
        tracing::info!(
            project_id = %project.id,
            client_id = %project.client_id,
            status = %project.status,
            "Project created"
        );
        Ok(project)
    }

    pub async fn update(&self, id: ProjectId, input: UpdateProjectInput) -> PortalResult<Project> {
        let mut project = self.get(id).await?;

        if let Some(name) = input.name.as_deref() {
            project.name = Project::validate_name(name)?;
        }
        if input.description.is_some() {
            project.set_description(input.description)?;
        }
        if let Some(status) = input.status {
            project.status = status;
        }
        if let Some(progress) = input.progress {
            project.set_progress(progress)?;
        }
        if input.budget.is_some() {
            project.set_budget(input.budget)?;
        }
        project.touch();

        if !self.repo.update(&project).await? {
            return Err(PortalError::ProjectNotFound);
        }
        tracing::info!(project_id = %project.id, status = %project.status, progress = project.progress, "Project updated");
        Ok(project)
    }

    pub async fn delete(&self, id: ProjectId) -> PortalResult<()> {
        if !self.repo.delete(id).await? {
            return Err(PortalError::ProjectNotFound);
        }
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }
}
