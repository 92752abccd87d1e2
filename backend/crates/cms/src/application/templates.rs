//! Template use cases

use std::sync::Arc;

use kernel::id::TemplateId;
use kernel::pagination::ListParams;

use crate::domain::entity::template::Template;
use crate::domain::repository::TemplateRepository;
use crate::error::{CmsError, CmsResult};

pub struct CreateTemplateInput {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
}

#[derive(Default)]
pub struct UpdateTemplateInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
}

pub struct TemplateService<R>
where
    R: TemplateRepository,
{
    repo: Arc<R>,
}

impl<R> TemplateService<R>
where
    R: TemplateRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        category: Option<&str>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Template>, u64)> {
        let category = category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        self.repo.list(category.as_deref(), params).await
    }

    pub async fn get(&self, id: TemplateId) -> CmsResult<Template> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(CmsError::TemplateNotFound)
    }

    pub async fn create(&self, input: CreateTemplateInput) -> CmsResult<Template> {
        let mut template = Template::new(&input.name, &input.category)?;
        template.set_details(input.description, input.image_url, input.demo_url);
        self.repo.create(&template).await?;

        tracing::info!(template_id = %template.id, category = %template.category, "Template created");
        Ok(template)
    }

    pub async fn update(&self, id: TemplateId, input: UpdateTemplateInput) -> CmsResult<Template> {
        let mut template = self.get(id).await?;

        if let Some(name) = input.name.as_deref() {
            template.set_name(name)?;
        }
        if let Some(category) = input.category.as_deref() {
            template.set_category(category)?;
        }
        template.set_details(input.description, input.image_url, input.demo_url);
        template.touch();

        if !self.repo.update(&template).await? {
            return Err(CmsError::TemplateNotFound);
        }
        Ok(template)
    }

    pub async fn delete(&self, id: TemplateId) -> CmsResult<()> {
        if !self.repo.delete(id).await? {
            return Err(CmsError::TemplateNotFound);
        }
        tracing::info!(template_id = %id, "Template deleted");
        Ok(())
    }
}
