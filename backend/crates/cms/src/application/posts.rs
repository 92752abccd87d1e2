//! Blog post use cases
//!
//! Public reads only ever see published posts.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::PostId;
use kernel::pagination::ListParams;
use kernel::slug::Slug;

use crate::domain::entity::post::Post;
use crate::domain::repository::PostRepository;
use crate::domain::value_object::post_status::PostStatus;
use crate::error::{CmsError, CmsResult};

pub struct CreatePostInput {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

#[derive(Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

pub struct PostService<R>
where
    R: PostRepository,
{
    repo: Arc<R>,
}

impl<R> PostService<R>
where
    R: PostRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list_published(&self, params: &ListParams) -> CmsResult<(Vec<Post>, u64)> {
        self.repo.list(Some(PostStatus::Published), params).await
    }

    pub async fn get_published(&self, slug: &str) -> CmsResult<Post> {
        self.repo
            .find_by_slug(slug)
            .await?
            .filter(Post::is_published)
            .ok_or(CmsError::PostNotFound)
    }

    pub async fn list(
        &self,
        status: Option<PostStatus>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Post>, u64)> {
        self.repo.list(status, params).await
    }

    pub async fn get(&self, id: PostId) -> CmsResult<Post> {
        self.repo.find_by_id(id).await?.ok_or(CmsError::PostNotFound)
    }

    pub async fn create(&self, input: CreatePostInput) -> CmsResult<Post> {
        let slug = Slug::resolve(input.slug.as_deref(), &input.title)?;
        let mut post = Post::new(&input.title, slug, input.content)?;
        post.set_excerpt(input.excerpt)?;
        post.set_featured_image(input.featured_image);
        if let Some(status) = input.status {
            post.set_status(status, Utc::now());
        }

        self.ensure_slug_free(&post.slug, None).await?;
        self.repo.create(&post).await?;

        tracing::info!(post_id = %post.id, status = %post.status, "Post created");
        Ok(post)
    }

    pub async fn update(&self, id: PostId, input: UpdatePostInput) -> CmsResult<Post> {
        let mut post = self.get(id).await?;

        if let Some(title) = input.title.as_deref() {
            post.set_title(title)?;
        }
        if let Some(raw) = input.slug.as_deref() {
            let slug = Slug::new(raw)?;
            self.ensure_slug_free(&slug, Some(id)).await?;
            post.slug = slug;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        if input.excerpt.is_some() {
            post.set_excerpt(input.excerpt)?;
        }
        if input.featured_image.is_some() {
            post.set_featured_image(input.featured_image);
        }
        if let Some(status) = input.status {
            post.set_status(status, Utc::now());
        }
        post.touch();

        if !self.repo.update(&post).await? {
            return Err(CmsError::PostNotFound);
        }
        tracing::info!(post_id = %post.id, status = %post.status, "Post updated");
        Ok(post)
    }

    pub async fn delete(&self, id: PostId) -> CmsResult<()> {
        if !self.repo.delete(id).await? {
            return Err(CmsError::PostNotFound);
        }
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &Slug, owner: Option<PostId>) -> CmsResult<()> {
        match self.repo.find_by_slug(slug.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(CmsError::SlugTaken(slug.to_string()))
            }
            _ => Ok(()),
        }
    }
}
