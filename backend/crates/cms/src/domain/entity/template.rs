//! Template Entity
//!
//! A website template shown in the public catalog.

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::id::TemplateId;
use kernel::pagination::Searchable;

use super::{optional_text, required_text};

pub const NAME_MAX_LENGTH: usize = 200;
pub const CATEGORY_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    /// Free-form grouping, e.g. `company`, `ecommerce`, `school`
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn new(name: &str, category: &str) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: TemplateId::new(),
            name: required_text("Name", name, NAME_MAX_LENGTH)?,
            category: Self::validate_category(category)?,
            description: None,
            image_url: None,
            demo_url: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Categories compare case-insensitively, so they are stored lowercased
    pub fn validate_category(raw: &str) -> AppResult<String> {
        Ok(required_text("Category", raw, CATEGORY_MAX_LENGTH)?.to_lowercase())
    }

    pub fn set_name(&mut self, name: &str) -> AppResult<()> {
        self.name = required_text("Name", name, NAME_MAX_LENGTH)?;
        Ok(())
    }

    pub fn set_category(&mut self, category: &str) -> AppResult<()> {
        self.category = Self::validate_category(category)?;
        Ok(())
    }

    pub fn set_details(
        &mut self,
        description: Option<String>,
        image_url: Option<String>,
        demo_url: Option<String>,
    ) {
        if description.is_some() {
            self.description = optional_text(description);
        }
        if image_url.is_some() {
            self.image_url = optional_text(image_url);
        }
        if demo_url.is_some() {
            self.demo_url = optional_text(demo_url);
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Searchable for Template {
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

    #[test]
    fn test_category_is_normalized() {
        let template = Template::new("Landing", " Company ").unwrap();
        assert_eq!(template.category, "company");
        assert!(Template::new("Landing", "").is_err());
    }

    #[test]
    fn test_set_details_only_overwrites_given_fields() {
        let mut template = Template::new("Shop", "ecommerce").unwrap();
        template.set_details(Some("Online store".into()), None, Some("https://demo".into()));
        template.set_details(None, Some("https://img".into()), None);
        assert_eq!(template.description.as_deref(), Some("Online store"));
        assert_eq!(template.image_url.as_deref(), Some("https://img"));
        assert_eq!(template.demo_url.as_deref(), Some("https://demo"));

        template.set_details(Some(String::new()), None, None);
        assert_eq!(template.description, None);
    }
}
