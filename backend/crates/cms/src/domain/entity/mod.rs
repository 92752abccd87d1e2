//! Entity Module

pub mod page;
pub mod post;
pub mod template;

use kernel::error::app_error::{AppError, AppResult};

/// Trimmed, non-empty text of at most `max` characters
pub(crate) fn required_text(field: &str, raw: &str, max: usize) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::bad_request(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Blank optional text becomes `None`
pub(crate) fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
