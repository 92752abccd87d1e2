//! Blog Post Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::id::PostId;
use kernel::pagination::Searchable;
use kernel::slug::Slug;

use super::{optional_text, required_text};
use crate::domain::value_object::post_status::PostStatus;

pub const TITLE_MAX_LENGTH: usize = 200;
pub const EXCERPT_MAX_LENGTH: usize = 500;

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Unique
    pub slug: Slug,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    /// Set the first time the post is published and never changed after
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: &str, slug: Slug, content: String) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: PostId::new(),
            title: required_text("Title", title, TITLE_MAX_LENGTH)?,
            slug,
            content,
            excerpt: None,
            featured_image: None,
            status: PostStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_title(&mut self, title: &str) -> AppResult<()> {
        self.title = required_text("Title", title, TITLE_MAX_LENGTH)?;
        Ok(())
    }

    pub fn set_excerpt(&mut self, excerpt: Option<String>) -> AppResult<()> {
        self.excerpt = match optional_text(excerpt) {
            Some(text) => Some(required_text("Excerpt", &text, EXCERPT_MAX_LENGTH)?),
            None => None,
        };
        Ok(())
    }

    pub fn set_featured_image(&mut self, url: Option<String>) {
        self.featured_image = optional_text(url);
    }

    /// Change status. Publishing stamps `published_at` once; unpublishing
    /// keeps the original date.
    pub fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Searchable for Post {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "title" => Some(&self.title),
            "content" => Some(&self.content),
            "excerpt" => self.excerpt.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post() -> Post {
        Post::new("Hello", Slug::new("hello").unwrap(), "Body".into()).unwrap()
    }

    #[test]
    fn test_new_post_is_draft() {
        let post = post();
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());
        assert!(!post.is_published());
    }

    #[test]
    fn test_published_at_is_set_once() {
        let mut post = post();
        let first = Utc::now();
        post.set_status(PostStatus::Published, first);
        assert_eq!(post.published_at, Some(first));

        post.set_status(PostStatus::Draft, first + Duration::hours(1));
        post.set_status(PostStatus::Published, first + Duration::hours(2));
        assert_eq!(post.published_at, Some(first));
        assert!(post.is_published());
    }

    #[test]
    fn test_excerpt_length() {
        let mut post = post();
        assert!(post.set_excerpt(Some("x".repeat(501))).is_err());
        post.set_excerpt(Some("  short  ".into())).unwrap();
        assert_eq!(post.excerpt.as_deref(), Some("short"));
    }
}
