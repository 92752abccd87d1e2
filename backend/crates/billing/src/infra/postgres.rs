//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{InvoiceId, PricingPlanId, ProjectId, UserId};
use kernel::pagination::ListParams;
use kernel::slug::Slug;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{invoice::Invoice, pricing_plan::PricingPlan};
use crate::domain::repository::{InvoiceFilter, InvoiceRepository, PricingPlanRepository};
use crate::domain::value_object::{
    billing_period::BillingPeriod, invoice_number::InvoiceNumber, invoice_status::InvoiceStatus,
};
use crate::error::{BillingError, BillingResult};

const PLAN_COLUMNS: &str = "id, name, slug, description, price, billing_period, features, \
                            is_popular, is_active, sort_order, created_at, updated_at";
const INVOICE_COLUMNS: &str = "id, number, client_id, project_id, description, amount, currency, \
                               status, issued_at, due_date, paid_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgBillingRepository {
    pool: PgPool,
}

impl PgBillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Pricing plans
// ============================================================================

impl PricingPlanRepository for PgBillingRepository {
    async fn create(&self, plan: &PricingPlan) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pricing_plans (id, name, slug, description, price, billing_period,
                                       features, is_popular, is_active, sort_order,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(&plan.name)
        .bind(plan.slug.as_str())
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.billing_period.code())
        .bind(&plan.features)
        .bind(plan.is_popular)
        .bind(plan.is_active)
        .bind(plan.sort_order)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BillingError::SlugTaken(plan.slug.to_string())
            } else {
                BillingError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn update(&self, plan: &PricingPlan) -> BillingResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pricing_plans
            SET name = $2, slug = $3, description = $4, price = $5, billing_period = $6,
                features = $7, is_popular = $8, is_active = $9, sort_order = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(plan.id.as_uuid())
        .bind(&plan.name)
        .bind(plan.slug.as_str())
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.billing_period.code())
        .bind(&plan.features)
        .bind(plan.is_popular)
        .bind(plan.is_active)
        .bind(plan.sort_order)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BillingError::SlugTaken(plan.slug.to_string())
            } else {
                BillingError::Database(e)
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: PricingPlanId) -> BillingResult<Option<PricingPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(PlanRow::into_plan).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> BillingResult<Option<PricingPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PlanRow::into_plan).transpose()
    }

    async fn list(&self, params: &ListParams) -> BillingResult<(Vec<PricingPlan>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pricing_plans");
        if let Some(search) = &params.search {
            count.push(" WHERE ");
            search.push_sql(&mut count);
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PLAN_COLUMNS} FROM pricing_plans"));
        if let Some(search) = &params.search {
            query.push(" WHERE ");
            search.push_sql(&mut query);
        }
        params.push_order_and_page(&mut query);
        let rows: Vec<PlanRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let plans = rows
            .into_iter()
            .map(PlanRow::into_plan)
            .collect::<BillingResult<Vec<_>>>()?;
        Ok((plans, u64::try_from(total).unwrap_or(0)))
    }

    async fn list_active(&self) -> BillingResult<Vec<PricingPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM pricing_plans WHERE is_active ORDER BY sort_order ASC, name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PlanRow::into_plan).collect()
    }

    async fn delete(&self, id: PricingPlanId) -> BillingResult<bool> {
        let result = sqlx::query("DELETE FROM pricing_plans WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    price: i64,
    billing_period: String,
    features: Vec<String>,
    is_popular: bool,
    is_active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlanRow {
    fn into_plan(self) -> BillingResult<PricingPlan> {
        let billing_period = BillingPeriod::from_code(&self.billing_period).ok_or_else(|| {
            BillingError::Internal(format!(
                "unknown billing period in database: {}",
                self.billing_period
            ))
        })?;
        Ok(PricingPlan {
            id: PricingPlanId::from(self.id),
            name: self.name,
            slug: Slug::from_db(self.slug),
            description: self.description,
            price: self.price,
            billing_period,
            features: self.features,
            is_popular: self.is_popular,
            is_active: self.is_active,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ============================================================================
// Invoices
// ============================================================================

fn push_invoice_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &InvoiceFilter,
    params: &ListParams,
) {
    builder.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.code());
    }
    if let Some(client_id) = filter.client_id {
        builder.push(" AND client_id = ").push_bind(client_id.into_uuid());
    }
    if let Some(search) = &params.search {
        builder.push(" AND ");
        search.push_sql(builder);
    }
}

impl InvoiceRepository for PgBillingRepository {
    async fn create(&self, invoice: &Invoice) -> BillingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, number, client_id, project_id, description, amount,
                                  currency, status, issued_at, due_date, paid_at,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.number.as_str())
        .bind(invoice.client_id.as_uuid())
        .bind(invoice.project_id.map(ProjectId::into_uuid))
        .bind(&invoice.description)
        .bind(invoice.amount)
        .bind(&invoice.currency)
        .bind(invoice.status.code())
        .bind(invoice.issued_at)
        .bind(invoice.due_date)
        .bind(invoice.paid_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BillingError::NumberTaken(invoice.number.to_string())
            } else {
                BillingError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn update_status(&self, invoice: &Invoice, from: InvoiceStatus) -> BillingResult<bool> {
        let result = sqlx::query(
            "UPDATE invoices SET status = $2, paid_at = $3, updated_at = $4 \
             WHERE id = $1 AND status = $5",
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.status.code())
        .bind(invoice.paid_at)
        .bind(invoice.updated_at)
        .bind(from.code())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: InvoiceId) -> BillingResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn list(
        &self,
        filter: &InvoiceFilter,
        params: &ListParams,
    ) -> BillingResult<(Vec<Invoice>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM invoices");
        push_invoice_filters(&mut count, filter, params);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {INVOICE_COLUMNS} FROM invoices"));
        push_invoice_filters(&mut query, filter, params);
        params.push_order_and_page(&mut query);
        let rows: Vec<InvoiceRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let invoices = rows
            .into_iter()
            .map(InvoiceRow::into_invoice)
            .collect::<BillingResult<Vec<_>>>()?;
        Ok((invoices, u64::try_from(total).unwrap_or(0)))
    }

    async fn delete(&self, id: InvoiceId) -> BillingResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND status = 'draft'")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    number: String,
    client_id: Uuid,
    project_id: Option<Uuid>,
    description: String,
    amount: i64,
    currency: String,
    status: String,
    issued_at: DateTime<Utc>,
    due_date: Option<NaiveDate>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self) -> BillingResult<Invoice> {
        let status = InvoiceStatus::from_code(&self.status).ok_or_else(|| {
            BillingError::Internal(format!("unknown invoice status in database: {}", self.status))
        })?;
        Ok(Invoice {
            id: InvoiceId::from(self.id),
            number: InvoiceNumber::from_db(self.number),
            client_id: UserId::from(self.client_id),
            project_id: self.project_id.map(ProjectId::from),
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            status,
            issued_at: self.issued_at,
            due_date: self.due_date,
            paid_at: self.paid_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
