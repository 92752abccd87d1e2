//! Invoice numbers: `INV-YYYYMM-XXXXXX`

use chrono::{DateTime, Datelike, Utc};
use platform::crypto::random_code;
use serde::{Deserialize, Serialize};
use std::fmt;

const PREFIX: &str = "INV";
const SUFFIX_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// New number for an invoice issued at `at`, with a random suffix
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self(format!(
            "{PREFIX}-{:04}{:02}-{}",
            at.year(),
            at.month(),
            random_code(SUFFIX_LENGTH)
        ))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
