//! Page Entity
//!
//! A static marketing page (about, services, contact, ...).

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::id::PageId;
use kernel::pagination::Searchable;
use kernel::slug::Slug;

use super::{optional_text, required_text};

pub const TITLE_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    /// Unique
    pub slug: Slug,
    pub content: String,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(
        title: &str,
        slug: Slug,
        content: String,
        meta_description: Option<String>,
    ) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: PageId::new(),
            title: required_text("Title", title, TITLE_MAX_LENGTH)?,
            slug,
            content,
            meta_description: optional_text(meta_description),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_title(&mut self, title: &str) -> AppResult<()> {
        self.title = required_text("Title", title, TITLE_MAX_LENGTH)?;
        Ok(())
    }

    pub fn set_meta_description(&mut self, meta: Option<String>) {
        self.meta_description = optional_text(meta);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Searchable for Page {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "title" => Some(&self.title),
            "content" => Some(&self.content),
            _ => None,
        }
    }
}
