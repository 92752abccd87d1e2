//! Email Value Object
//!
//! Account login identity and uniqueness key. Stored trimmed and lowercased,
//! so `Client@JasaWeb.id` and `client@jasaweb.id` are the same account.

use std::fmt;
use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// RFC 5321 path limit
const EMAIL_MAX_LENGTH: usize = 254;
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

/// Why an address was rejected
fn format_problem(address: &str) -> Option<&'static str> {
    let Some((local, domain)) = address.split_once('@') else {
        return Some("Email must contain '@'");
    };

    if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH {
        return Some("Email local part must be 1-64 characters");
    }
    if local.chars().any(char::is_whitespace) {
        return Some("Email must not contain spaces");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Some("Email domain must contain a dot");
    }
    let label_ok = |label: &&str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !labels.iter().all(label_ok) {
        return Some("Email domain is not valid");
    }

    None
}

impl Email {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let address = raw.into().trim().to_lowercase();

        if address.is_empty() {
            return Err(AppError::bad_request("Email is required"));
        }
        if address.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }
        if let Some(problem) = format_problem(&address) {
            return Err(AppError::bad_request(problem));
        }

        Ok(Self(address))
    }

    /// Trusts the value; only for rows read back from the database
    pub fn from_db(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for ok in [
            "user@example.com",
            "user.name@example.co.id",
            "user+tag@example.com",
            "ops@my-agency.id",
        ] {
            assert!(Email::new(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in [
            "",
            "   ",
            "userexample.com",
            "user@",
            "@example.com",
            "user@@example.com",
            "user@example",
            "user@.example.com",
            "user@example..com",
            "user@-example.com",
            "first last@example.com",
        ] {
            let err = Email::new(bad).unwrap_err();
            assert_eq!(err.status_code(), 400, "{bad}");
        }
    }

    #[test]
    fn test_length_limits() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(Email::new(long_local).is_err());

        let long_total = format!("a@{}.com", "b".repeat(260));
        assert!(Email::new(long_total).is_err());
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email: Email = "  Client@JasaWeb.ID ".parse().unwrap();
        assert_eq!(email.as_str(), "client@jasaweb.id");
        assert_eq!(email.to_string(), "client@jasaweb.id");
    }
}
