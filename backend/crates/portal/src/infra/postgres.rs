//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ProjectId, TicketId, UserId};
use kernel::pagination::ListParams;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{project::Project, ticket::Ticket};
use crate::domain::repository::{ProjectFilter, ProjectRepository, TicketFilter, TicketRepository};
use crate::domain::value_object::{
    project_status::ProjectStatus, ticket_priority::TicketPriority, ticket_status::TicketStatus,
};
use crate::error::{PortalError, PortalResult};

const PROJECT_COLUMNS: &str =
    "id, client_id, name, description, status, progress, budget, created_at, updated_at";
const TICKET_COLUMNS: &str =
    "id, client_id, project_id, subject, message, priority, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgPortalRepository {
    pool: PgPool,
}

impl PgPortalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Projects
// ============================================================================

fn push_project_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &ProjectFilter,
    params: &ListParams,
) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.code());
    }
    if let Some(client_id) = filter.client_id {
        builder.push(" AND client_id = ").push_bind(client_id.into_uuid());
    }
    if let Some(search) = &params.search {
        builder.push(" AND ");
        search.push_sql(builder);
    }
}

impl ProjectRepository for PgPortalRepository {
    async fn create(&self, project: &Project) -> PortalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, client_id, name, description, status, progress, budget,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(project.id.as_uuid())
        .bind(project.client_id.as_uuid())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.code())
        .bind(i16::from(project.progress))
        .bind(project.budget)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, project: &Project) -> PortalResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, description = $3, status = $4, progress = $5, budget = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(project.id.as_uuid())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status.code())
        .bind(i16::from(project.progress))
        .bind(project.budget)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: ProjectId) -> PortalResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProjectRow::into_project).transpose()
    }

    async fn list(
        &self,
        filter: &ProjectFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Project>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        push_project_filters(&mut count, filter, params);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PROJECT_COLUMNS} FROM projects"));
        push_project_filters(&mut query, filter, params);
        params.push_order_and_page(&mut query);
        let rows: Vec<ProjectRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let projects = rows
            .into_iter()
            .map(ProjectRow::into_project)
            .collect::<PortalResult<Vec<_>>>()?;
        Ok((projects, u64::try_from(total).unwrap_or(0)))
    }

    async fn delete(&self, id: ProjectId) -> PortalResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    client_id: Uuid,
    name: String,
    description: Option<String>,
    status: String,
    progress: i16,
    budget: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> PortalResult<Project> {
        let status = ProjectStatus::from_code(&self.status).ok_or_else(|| {
            PortalError::Internal(format!("unknown project status in database: {}", self.status))
        })?;
        let progress = u8::try_from(self.progress).map_err(|_| {
            PortalError::Internal(format!("project progress out of range: {}", self.progress))
        })?;
        Ok(Project {
            id: ProjectId::from(self.id),
            client_id: UserId::from(self.client_id),
            name: self.name,
            description: self.description,
            status,
            progress,
            budget: self.budget,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ============================================================================
// Tickets
// ============================================================================

fn push_ticket_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &TicketFilter,
    params: &ListParams,
) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.code());
    }
    if let Some(client_id) = filter.client_id {
        builder.push(" AND client_id = ").push_bind(client_id.into_uuid());
    }
    if let Some(search) = &params.search {
        builder.push(" AND ");
        search.push_sql(builder);
    }
}

impl TicketRepository for PgPortalRepository {
    async fn create(&self, ticket: &Ticket) -> PortalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets (id, client_id, project_id, subject, message, priority, status,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.client_id.as_uuid())
        .bind(ticket.project_id.map(ProjectId::into_uuid))
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(ticket.priority.code())
        .bind(ticket.status.code())
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_status(&self, ticket: &Ticket, from: TicketStatus) -> PortalResult<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.status.code())
        .bind(ticket.updated_at)
        .bind(from.code())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: TicketId) -> PortalResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn list(
        &self,
        filter: &TicketFilter,
        params: &ListParams,
    ) -> PortalResult<(Vec<Ticket>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets");
        push_ticket_filters(&mut count, filter, params);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {TICKET_COLUMNS} FROM tickets"));
        push_ticket_filters(&mut query, filter, params);
        params.push_order_and_page(&mut query);
        let rows: Vec<TicketRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let tickets = rows
            .into_iter()
            .map(TicketRow::into_ticket)
            .collect::<PortalResult<Vec<_>>>()?;
        Ok((tickets, u64::try_from(total).unwrap_or(0)))
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    client_id: Uuid,
    project_id: Option<Uuid>,
    subject: String,
    message: String,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self) -> PortalResult<Ticket> {
        let priority = TicketPriority::from_code(&self.priority).ok_or_else(|| {
            PortalError::Internal(format!("unknown ticket priority in database: {}", self.priority))
        })?;
        let status = TicketStatus::from_code(&self.status).ok_or_else(|| {
            PortalError::Internal(format!("unknown ticket status in database: {}", self.status))
        })?;
        Ok(Ticket {
            id: TicketId::from(self.id),
            client_id: UserId::from(self.client_id),
            project_id: self.project_id.map(ProjectId::from),
            subject: self.subject,
            message: self.message,
            priority,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
