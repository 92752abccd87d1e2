//! URL slugs
//!
//! Lowercase ASCII letters and digits separated by single hyphens. Shared by
//! every resource addressed by slug (pages, posts, pricing plans).

use std::fmt;

use crate::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const SLUG_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Validate a client-supplied slug
    pub fn new(raw: &str) -> AppResult<Self> {
        let slug = raw.trim();
        if slug.is_empty() {
            return Err(AppError::bad_request("Slug cannot be empty"));
        }
        if slug.len() > SLUG_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Slug must be at most {} characters",
                SLUG_MAX_LENGTH
            )));
        }
        let well_formed = slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        });
        if !well_formed {
            return Err(AppError::bad_request(
                "Slug may contain only lowercase letters, digits and single hyphens",
            ));
        }
        Ok(Self(slug.to_string()))
    }

    /// Derive a slug from a title: accents stripped, anything else that is
    /// not alphanumeric collapses into one hyphen.
    pub fn from_title(title: &str) -> AppResult<Self> {
        let mut slug = String::with_capacity(title.len());
        let mut pending_hyphen = false;

        for c in title.nfkd().filter(|c| !is_combining_mark(*c)) {
            if c.is_ascii_alphanumeric() {
                let hyphen = pending_hyphen && !slug.is_empty();
                if slug.len() + usize::from(hyphen) + 1 > SLUG_MAX_LENGTH {
                    break;
                }
                if hyphen {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            return Err(AppError::bad_request(
                "Cannot derive a slug from the title; provide one explicitly",
            ));
        }
        Ok(Self(slug))
    }

    /// Use `explicit` when given, otherwise derive from `title`
    pub fn resolve(explicit: Option<&str>, title: &str) -> AppResult<Self> {
        match explicit.map(str::trim) {
            Some(raw) if !raw.is_empty() => Self::new(raw),
            _ => Self::from_title(title),
        }
    }

    /// Wrap a value read back from the database
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title() {
        assert_eq!(Slug::from_title("Hello, World!").unwrap().as_str(), "hello-world");
        assert_eq!(Slug::from_title("  Jasa   Web -- 2024 ").unwrap().as_str(), "jasa-web-2024");
        assert_eq!(Slug::from_title("Café Crème").unwrap().as_str(), "cafe-creme");
        assert!(Slug::from_title("!!!").is_err());
    }

    #[test]
    fn test_new_validates_shape() {
        assert!(Slug::new("about-us").is_ok());
        assert!(Slug::new("About").is_err());
        assert!(Slug::new("a--b").is_err());
        assert!(Slug::new("-a").is_err());
        assert!(Slug::new("a b").is_err());
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        assert_eq!(Slug::resolve(Some("custom"), "Title").unwrap().as_str(), "custom");
        assert_eq!(Slug::resolve(Some("  "), "My Title").unwrap().as_str(), "my-title");
        assert_eq!(Slug::resolve(None, "My Title").unwrap().as_str(), "my-title");
    }

    #[test]
    fn test_from_title_is_bounded() {
        let slug = Slug::from_title(&"ab ".repeat(200)).unwrap();
        assert!(slug.as_str().len() <= SLUG_MAX_LENGTH);
        assert!(Slug::new(slug.as_str()).is_ok());
    }
}
