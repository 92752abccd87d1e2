//! Invoice Entity

use chrono::{DateTime, NaiveDate, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{InvoiceId, ProjectId, UserId};
use kernel::pagination::Searchable;

use crate::domain::value_object::{invoice_number::InvoiceNumber, invoice_status::InvoiceStatus};
use crate::error::{BillingError, BillingResult};

pub const DEFAULT_CURRENCY: &str = "IDR";

#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Unique
    pub number: InvoiceNumber,
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub description: String,
    /// Whole units of `currency`
    pub amount: i64,
    /// ISO 4217 code
    pub currency: String,
    pub status: InvoiceStatus,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    /// Set on entering `paid`
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        client_id: UserId,
        project_id: Option<ProjectId>,
        description: &str,
        amount: i64,
        currency: Option<&str>,
        due_date: Option<NaiveDate>,
    ) -> AppResult<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::bad_request("Description cannot be empty"));
        }
        if amount <= 0 {
            return Err(AppError::bad_request("Amount must be greater than 0"));
        }
        let currency = Self::validate_currency(currency.unwrap_or(DEFAULT_CURRENCY))?;

        let now = Utc::now();
        if due_date.is_some_and(|d| d < now.date_naive()) {
            return Err(AppError::bad_request("Due date cannot be in the past"));
        }

        Ok(Self {
            id: InvoiceId::new(),
            number: InvoiceNumber::generate(now),
            client_id,
            project_id,
            description: description.to_string(),
            amount,
            currency,
            status: InvoiceStatus::Draft,
            issued_at: now,
            due_date,
            paid_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_currency(raw: &str) -> AppResult<String> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(AppError::bad_request(
                "Currency must be a three-letter ISO 4217 code",
            ));
        }
        Ok(code)
    }

    /// Move to `next` if the lifecycle allows it
    pub fn transition(&mut self, next: InvoiceStatus, now: DateTime<Utc>) -> BillingResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(BillingError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next == InvoiceStatus::Paid {
            self.paid_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Fresh number after a collision
    pub fn renumber(&mut self) {
        self.number = InvoiceNumber::generate(self.issued_at);
    }
}

impl Searchable for Invoice {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "number" => Some(self.number.as_str()),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> Invoice {
        Invoice::new(UserId::new(), None, "Website build", 5_000_000, None, None).unwrap()
    }

    #[test]
    fn test_new_invoice_defaults() {
        let invoice = invoice();
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.currency, "IDR");
        assert!(invoice.number.as_str().starts_with("INV-"));
        assert!(invoice.paid_at.is_none());
    }

    #[test]
    fn test_new_invoice_validation() {
        let client = UserId::new();
        assert!(Invoice::new(client, None, " ", 1, None, None).is_err());
        assert!(Invoice::new(client, None, "x", 0, None, None).is_err());
        assert!(Invoice::new(client, None, "x", 1, Some("rupiah"), None).is_err());
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        assert!(Invoice::new(client, None, "x", 1, None, Some(yesterday)).is_err());
        assert_eq!(
            Invoice::new(client, None, "x", 1, Some("usd"), None)
                .unwrap()
                .currency,
            "USD"
        );
    }

    #[test]
    fn test_paid_sets_paid_at() {
        let mut invoice = invoice();
        let now = Utc::now();
        invoice.transition(InvoiceStatus::Sent, now).unwrap();
        assert!(invoice.paid_at.is_none());
        invoice.transition(InvoiceStatus::Paid, now).unwrap();
        assert_eq!(invoice.paid_at, Some(now));
    }

    #[test]
    fn test_invalid_transition_leaves_invoice_unchanged() {
        let mut invoice = invoice();
        let err = invoice
            .transition(InvoiceStatus::Paid, Utc::now())
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidTransition { .. }));
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert!(invoice.paid_at.is_none());
    }
}
