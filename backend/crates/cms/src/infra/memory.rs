//! In-memory CMS store for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::{PageId, PostId, TemplateId};
use kernel::pagination::ListParams;
use tokio::sync::RwLock;

use crate::domain::entity::{page::Page, post::Post, template::Template};
use crate::domain::repository::{PageRepository, PostRepository, TemplateRepository};
use crate::domain::value_object::post_status::PostStatus;
use crate::error::{CmsError, CmsResult};

#[derive(Clone, Default)]
pub struct InMemoryCmsRepository {
    pages: Arc<RwLock<HashMap<PageId, Page>>>,
    templates: Arc<RwLock<HashMap<TemplateId, Template>>>,
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryCmsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pages(&self) -> Vec<Page> {
        self.pages.read().await.values().cloned().collect()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.values().cloned().collect()
    }

    pub async fn templates(&self) -> Vec<Template> {
        self.templates.read().await.values().cloned().collect()
    }
}

impl PageRepository for InMemoryCmsRepository {
    async fn create(&self, page: &Page) -> CmsResult<()> {
        let mut pages = self.pages.write().await;
        if pages.values().any(|p| p.slug == page.slug) {
            return Err(CmsError::SlugTaken(page.slug.to_string()));
        }
        pages.insert(page.id, page.clone());
        Ok(())
    }

    async fn update(&self, page: &Page) -> CmsResult<bool> {
        let mut pages = self.pages.write().await;
        if pages.values().any(|p| p.slug == page.slug && p.id != page.id) {
            return Err(CmsError::SlugTaken(page.slug.to_string()));
        }
        Ok(match pages.get_mut(&page.id) {
            Some(existing) => {
                *existing = page.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: PageId) -> CmsResult<Option<Page>> {
        Ok(self.pages.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Page>> {
        Ok(self
            .pages
            .read()
            .await
            .values()
            .find(|p| p.slug.as_str() == slug)
            .cloned())
    }

    async fn list(&self, params: &ListParams) -> CmsResult<(Vec<Page>, u64)> {
        let mut pages: Vec<Page> = self
            .pages
            .read()
            .await
            .values()
            .filter(|p| params.search.as_ref().is_none_or(|s| s.matches(*p)))
            .cloned()
            .collect();

        pages.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "title" => a.title.cmp(&b.title),
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(pages))
    }

    async fn delete(&self, id: PageId) -> CmsResult<bool> {
        Ok(self.pages.write().await.remove(&id).is_some())
    }
}

impl TemplateRepository for InMemoryCmsRepository {
    async fn create(&self, template: &Template) -> CmsResult<()> {
        self.templates
            .write()
            .await
            .insert(template.id, template.clone());
        Ok(())
    }

    async fn update(&self, template: &Template) -> CmsResult<bool> {
        let mut templates = self.templates.write().await;
        Ok(match templates.get_mut(&template.id) {
            Some(existing) => {
                *existing = template.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: TemplateId) -> CmsResult<Option<Template>> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn list(
        &self,
        category: Option<&str>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Template>, u64)> {
        let mut templates: Vec<Template> = self
            .templates
            .read()
            .await
            .values()
            .filter(|t| category.is_none_or(|c| t.category == c))
            .filter(|t| params.search.as_ref().is_none_or(|s| s.matches(*t)))
            .cloned()
            .collect();

        templates.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "name" => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(templates))
    }

    async fn delete(&self, id: TemplateId) -> CmsResult<bool> {
        Ok(self.templates.write().await.remove(&id).is_some())
    }
}

impl PostRepository for InMemoryCmsRepository {
    async fn create(&self, post: &Post) -> CmsResult<()> {
        let mut posts = self.posts.write().await;
        if posts.values().any(|p| p.slug == post.slug) {
            return Err(CmsError::SlugTaken(post.slug.to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> CmsResult<bool> {
        let mut posts = self.posts.write().await;
        if posts.values().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(CmsError::SlugTaken(post.slug.to_string()));
        }
        Ok(match posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: PostId) -> CmsResult<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Post>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .find(|p| p.slug.as_str() == slug)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<PostStatus>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Post>, u64)> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .filter(|p| params.search.as_ref().is_none_or(|s| s.matches(*p)))
            .cloned()
            .collect();

        posts.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "title" => a.title.cmp(&b.title),
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                "published_at" => a.published_at.cmp(&b.published_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(posts))
    }

    async fn delete(&self, id: PostId) -> CmsResult<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
