//! Client Project Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{ProjectId, UserId};
use kernel::pagination::Searchable;

use super::required_text;
use crate::domain::value_object::project_status::ProjectStatus;

pub const NAME_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MAX_LENGTH: usize = 5000;

#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    pub client_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Percent complete, 0..=100
    pub progress: u8,
    /// Agreed budget in whole rupiah
    pub budget: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(client_id: UserId, name: &str) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            client_id,
            name: Self::validate_name(name)?,
            description: None,
            status: ProjectStatus::Pending,
            progress: 0,
            budget: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_name(raw: &str) -> AppResult<String> {
        required_text("Name", raw, NAME_MAX_LENGTH)
    }

    pub fn set_description(&mut self, raw: Option<String>) -> AppResult<()> {
        let description = raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_LENGTH)
        {
            return Err(AppError::bad_request(format!(
                "Description must be at most {DESCRIPTION_MAX_LENGTH} characters"
            )));
        }
        self.description = description;
        Ok(())
    }

    /// Accepts any integer so out-of-range input gets a 400, not a parse error
    pub fn set_progress(&mut self, progress: i64) -> AppResult<()> {
        self.progress = u8::try_from(progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| AppError::bad_request("Progress must be between 0 and 100"))?;
        Ok(())
    }

    pub fn set_budget(&mut self, budget: Option<i64>) -> AppResult<()> {
        if budget.is_some_and(|b| b < 0) {
            return Err(AppError::bad_request("Budget cannot be negative"));
        }
        self.budget = budget;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Searchable for Project {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new(UserId::new(), "Company Profile").unwrap()
    }

    #[test]
    fn test_new_project_is_pending() {
        let project = project();
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.progress, 0);
        assert!(Project::new(UserId::new(), "   ").is_err());
    }

    #[test]
    fn test_progress_bounds() {
        let mut project = project();
        assert!(project.set_progress(0).is_ok());
        assert!(project.set_progress(100).is_ok());
        assert_eq!(project.progress, 100);
        assert!(project.set_progress(101).is_err());
        assert!(project.set_progress(-1).is_err());
        assert_eq!(project.progress, 100);
    }

    #[test]
    fn test_negative_budget_is_rejected() {
        let mut project = project();
        assert!(project.set_budget(Some(-5)).is_err());
        assert!(project.set_budget(Some(15_000_000)).is_ok());
        assert!(project.set_budget(None).is_ok());
    }
}
