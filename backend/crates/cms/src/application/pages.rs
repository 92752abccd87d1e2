//! Page use cases

use std::sync::Arc;

use kernel::id::PageId;
use kernel::pagination::ListParams;
use kernel::slug::Slug;

use crate::domain::entity::page::Page;
use crate::domain::repository::PageRepository;
use crate::error::{CmsError, CmsResult};

pub struct CreatePageInput {
    pub title: String,
    /// Derived from the title when absent
    pub slug: Option<String>,
    pub content: String,
    pub meta_description: Option<String>,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Default)]
pub struct UpdatePageInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub meta_description: Option<String>,
}

pub struct PageService<R>
where
    R: PageRepository,
{
    repo: Arc<R>,
}

impl<R> PageService<R>
where
    R: PageRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, params: &ListParams) -> CmsResult<(Vec<Page>, u64)> {
        self.repo.list(params).await
    }

    pub async fn get(&self, id: PageId) -> CmsResult<Page> {
        self.repo.find_by_id(id).await?.ok_or(CmsError::PageNotFound)
    }

    pub async fn get_by_slug(&self, slug: &str) -> CmsResult<Page> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or(CmsError::PageNotFound)
    }

    pub async fn create(&self, input: CreatePageInput) -> CmsResult<Page> {
        let slug = Slug::resolve(input.slug.as_deref(), &input.title)?;
        let page = Page::new(&input.title, slug, input.content, input.meta_description)?;

        self.ensure_slug_free(&page.slug, None).await?;
        self.repo.create(&page).await?;

        tracing::info!(page_id = %page.id, slug = %page.slug, "Page created");
        Ok(page)
    }

    pub async fn update(&self, id: PageId, input: UpdatePageInput) -> CmsResult<Page> {
        let mut page = self.get(id).await?;

        if let Some(title) = input.title.as_deref() {
            page.set_title(title)?;
        }
        if let Some(raw) = input.slug.as_deref() {
            let slug = Slug::new(raw)?;
            self.ensure_slug_free(&slug, Some(id)).await?;
            page.slug = slug;
        }
        if let Some(content) = input.content {
            page.content = content;
        }
        if input.meta_description.is_some() {
            page.set_meta_description(input.meta_description);
        }
        page.touch();

        if !self.repo.update(&page).await? {
            return Err(CmsError::PageNotFound);
        }
        tracing::info!(page_id = %page.id, "Page updated");
        Ok(page)
    }

    pub async fn delete(&self, id: PageId) -> CmsResult<()> {
        if !self.repo.delete(id).await? {
            return Err(CmsError::PageNotFound);
        }
        tracing::info!(page_id = %id, "Page deleted");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &Slug, owner: Option<PageId>) -> CmsResult<()> {
        match self.repo.find_by_slug(slug.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(CmsError::SlugTaken(slug.to_string()))
            }
            _ => Ok(()),
        }
    }
}
