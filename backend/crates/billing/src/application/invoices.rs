//! Invoice use cases
//!
//! Admins manage every invoice; clients only see their own.

use std::sync::Arc;

use auth::{Action, CurrentUser, Resource, require};
use chrono::{NaiveDate, Utc};
use kernel::id::{InvoiceId, ProjectId, UserId};
use kernel::pagination::ListParams;

use crate::domain::entity::invoice::Invoice;
use crate::domain::repository::{InvoiceFilter, InvoiceRepository};
use crate::domain::value_object::invoice_status::InvoiceStatus;
use crate::error::{BillingError, BillingResult};

/// Attempts at finding an unused invoice number
const NUMBER_ATTEMPTS: usize = 3;

pub struct CreateInvoiceInput {
    pub client_id: UserId,
    pub project_id: Option<ProjectId>,
    pub description: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub due_date: Option<NaiveDate>,
}

pub struct InvoiceService<R>
where
    R: InvoiceRepository,
{
    repo: Arc<R>,
}

impl<R> InvoiceService<R>
where
    R: InvoiceRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filter: &InvoiceFilter,
        params: &ListParams,
    ) -> BillingResult<(Vec<Invoice>, u64)> {
        self.repo.list(filter, params).await
    }

    /// The caller's own invoices, optionally narrowed by status
    pub async fn list_for(
        &self,
        user: &CurrentUser,
        status: Option<InvoiceStatus>,
        params: &ListParams,
    ) -> BillingResult<(Vec<Invoice>, u64)> {
        require(
            Some(user),
            Resource::Invoice {
                owner: Some(user.id),
            },
            Action::Read,
        )?;
        let filter = InvoiceFilter {
            status,
            client_id: Some(user.id),
        };
        self.repo.list(&filter, params).await
    }

    pub async fn get(&self, id: InvoiceId) -> BillingResult<Invoice> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(BillingError::InvoiceNotFound)
    }

    /// An invoice the caller may read
    pub async fn get_for(&self, user: &CurrentUser, id: InvoiceId) -> BillingResult<Invoice> {
        let invoice = self.get(id).await?;
        require(
            Some(user),
            Resource::Invoice {
                owner: Some(invoice.client_id),
            },
            Action::Read,
        )?;
        Ok(invoice)
    }

    pub async fn create(&self, input: CreateInvoiceInput) -> BillingResult<Invoice> {
        let mut invoice = Invoice::new(
            input.client_id,
            input.project_id,
            &input.description,
            input.amount,
            input.currency.as_deref(),
            input.due_date,
        )?;

        let mut attempt = 1;
        loop {
            match self.repo.create(&invoice).await {
                Ok(()) => break,
                Err(BillingError::NumberTaken(number)) if attempt < NUMBER_ATTEMPTS => {
                    tracing::debug!(%number, attempt, "Invoice number collision, regenerating");
                    invoice.renumber();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            client_id = %invoice.client_id,
            amount = invoice.amount,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn update_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> BillingResult<Invoice> {
        let mut invoice = self.get(id).await?;
        let from = invoice.status;
        invoice.transition(status, Utc::now())?;

        if !self.repo.update_status(&invoice, from).await? {
            let current = self.get(id).await?.status;
            tracing::warn!(
                invoice_id = %id,
                %from,
                %current,
                to = %status,
                "Invoice status changed concurrently"
            );
            return Err(BillingError::StatusChanged { current });
        }
        tracing::info!(invoice_id = %invoice.id, %from, to = %status, "Invoice status changed");
        Ok(invoice)
    }

    /// Only drafts can be deleted
    pub async fn delete(&self, id: InvoiceId) -> BillingResult<()> {
        let invoice = self.get(id).await?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(BillingError::InvoiceNotDraft);
        }
        if !self.repo.delete(id).await? {
            return Err(BillingError::InvoiceNotFound);
        }
        tracing::info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::app_error::AppError;

    use crate::infra::memory::InMemoryBillingRepository;

    /// Serves one fixed snapshot from `find_by_id`, as a request that read
    /// the row before another one wrote it would see it.
    struct StaleReads {
        inner: InMemoryBillingRepository,
        snapshot: Invoice,
    }

    impl InvoiceRepository for StaleReads {
        async fn create(&self, invoice: &Invoice) -> BillingResult<()> {
            self.inner.create(invoice).await
        }

        async fn update_status(&self, invoice: &Invoice, from: InvoiceStatus) -> BillingResult<bool> {
            self.inner.update_status(invoice, from).await
        }

        async fn find_by_id(&self, id: InvoiceId) -> BillingResult<Option<Invoice>> {
            if id == self.snapshot.id {
                return Ok(Some(self.snapshot.clone()));
            }
            self.inner.find_by_id(id).await
        }

        async fn list(
            &self,
            filter: &InvoiceFilter,
            params: &ListParams,
        ) -> BillingResult<(Vec<Invoice>, u64)> {
            self.inner.list(filter, params).await
        }

        async fn delete(&self, id: InvoiceId) -> BillingResult<bool> {
            self.inner.delete(id).await
        }
    }

    async fn sent_invoice(repo: &InMemoryBillingRepository) -> Invoice {
        let service = InvoiceService::new(Arc::new(repo.clone()));
        let invoice = service
            .create(CreateInvoiceInput {
                client_id: UserId::new(),
                project_id: None,
                description: "Landing page".to_string(),
                amount: 1_500_000,
                currency: None,
                due_date: None,
            })
            .await
            .unwrap();
        service
            .update_status(invoice.id, InvoiceStatus::Sent)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_racing_terminal_transitions_only_one_wins() {
        let repo = InMemoryBillingRepository::new();
        let sent = sent_invoice(&repo).await;

        // Both callers read the invoice while it was still `sent`
        let first = InvoiceService::new(Arc::new(StaleReads {
            inner: repo.clone(),
            snapshot: sent.clone(),
        }));
        let second = InvoiceService::new(Arc::new(StaleReads {
            inner: repo.clone(),
            snapshot: sent.clone(),
        }));

        let paid = first.update_status(sent.id, InvoiceStatus::Paid).await.unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);

        let err = second
            .update_status(sent.id, InvoiceStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::StatusChanged { .. }));
        assert_eq!(AppError::from(err).status_code(), 409);

        let stored = repo.find_by_id(sent.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Paid);
        assert!(stored.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_status_update_of_missing_invoice_is_not_found() {
        let service = InvoiceService::new(Arc::new(InMemoryBillingRepository::new()));
        let err = service
            .update_status(InvoiceId::new(), InvoiceStatus::Sent)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvoiceNotFound));
    }
}
