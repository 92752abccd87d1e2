//! HTTP Handlers

use auth::{Action, CurrentUser, Resource, require};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::error::app_error::AppError;
use kernel::id::{InvoiceId, PricingPlanId, UserId};
use kernel::pagination::{Paginated, RawListQuery};
use std::sync::Arc;

use crate::application::listing::{INVOICE_LISTING, PLAN_LISTING};
use crate::application::{
    CreateInvoiceInput, CreatePlanInput, InvoiceService, PricingPlanService, UpdatePlanInput,
};
use crate::domain::repository::{InvoiceFilter, InvoiceRepository, PricingPlanRepository};
use crate::domain::value_object::{billing_period::BillingPeriod, invoice_status::InvoiceStatus};
use crate::error::BillingResult;
use crate::presentation::dto::{
    CreateInvoiceRequest, CreatePlanRequest, InvoiceListQuery, InvoiceResponse, PlanResponse,
    UpdateInvoiceStatusRequest, UpdatePlanRequest,
};

/// Shared state for billing handlers
#[derive(Clone)]
pub struct BillingAppState<R>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

fn parse_period(raw: Option<&str>) -> BillingResult<Option<BillingPeriod>> {
    Ok(raw.map(str::parse::<BillingPeriod>).transpose()?)
}

fn parse_invoice_status(raw: Option<&str>) -> BillingResult<Option<InvoiceStatus>> {
    Ok(raw.map(str::parse::<InvoiceStatus>).transpose()?)
}

// ============================================================================
// Public
// ============================================================================

/// GET /api/pricing/plans
pub async fn list_active_plans<R>(
    State(state): State<BillingAppState<R>>,
) -> BillingResult<Json<Vec<PlanResponse>>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    let plans = PricingPlanService::new(state.repo.clone())
        .list_active()
        .await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

// ============================================================================
// Admin: pricing plans
// ============================================================================

/// GET /api/admin/pricing-plans
pub async fn list_plans<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Query(query): Query<RawListQuery>,
) -> BillingResult<Json<Paginated<PlanResponse>>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::PricingPlan, Action::Read)?;
    let params = query.validate(&PLAN_LISTING)?;
    let (plans, total) = PricingPlanService::new(state.repo.clone())
        .list(&params)
        .await?;
    Ok(Json(Paginated::new(plans, total, &params).map(PlanResponse::from)))
}

/// GET /api/admin/pricing-plans/{id}
pub async fn get_plan<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PricingPlanId>,
) -> BillingResult<Json<PlanResponse>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::PricingPlan, Action::Read)?;
    let plan = PricingPlanService::new(state.repo.clone()).get(id).await?;
    Ok(Json(plan.into()))
}

/// POST /api/admin/pricing-plans
pub async fn create_plan<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreatePlanRequest>,
) -> BillingResult<(StatusCode, Json<PlanResponse>)>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::PricingPlan, Action::Create)?;
    let plan = PricingPlanService::new(state.repo.clone())
        .create(CreatePlanInput {
            billing_period: parse_period(req.billing_period.as_deref())?.unwrap_or_default(),
            name: req.name,
            slug: req.slug,
            description: req.description,
            price: req.price,
            features: req.features,
            is_popular: req.is_popular,
            is_active: req.is_active,
            sort_order: req.sort_order,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(plan.into())))
}

/// PUT /api/admin/pricing-plans/{id}
pub async fn update_plan<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PricingPlanId>,
    Json(req): Json<UpdatePlanRequest>,
) -> BillingResult<Json<PlanResponse>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::PricingPlan, Action::Update)?;
    let plan = PricingPlanService::new(state.repo.clone())
        .update(
            id,
            UpdatePlanInput {
                billing_period: parse_period(req.billing_period.as_deref())?,
                name: req.name,
                slug: req.slug,
                description: req.description,
                price: req.price,
                features: req.features,
                is_popular: req.is_popular,
                is_active: req.is_active,
                sort_order: req.sort_order,
            },
        )
        .await?;
    Ok(Json(plan.into()))
}

/// DELETE /api/admin/pricing-plans/{id}
pub async fn delete_plan<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PricingPlanId>,
) -> BillingResult<StatusCode>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::PricingPlan, Action::Delete)?;
    PricingPlanService::new(state.repo.clone())
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: invoices
// ============================================================================

/// GET /api/admin/invoices
pub async fn list_invoices<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Query(query): Query<InvoiceListQuery>,
) -> BillingResult<Json<Paginated<InvoiceResponse>>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Invoice { owner: None }, Action::Read)?;
    let filter = InvoiceFilter {
        status: parse_invoice_status(query.status.as_deref())?,
        client_id: query
            .client_id
            .as_deref()
            .map(|raw| raw.trim().parse::<UserId>().map_err(AppError::from))
            .transpose()?,
    };
    let params = query.list.validate(&INVOICE_LISTING)?;
    let (invoices, total) = InvoiceService::new(state.repo.clone())
        .list(&filter, &params)
        .await?;
    Ok(Json(
        Paginated::new(invoices, total, &params).map(InvoiceResponse::from),
    ))
}

/// GET /api/admin/invoices/{id}
pub async fn get_invoice<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<InvoiceId>,
) -> BillingResult<Json<InvoiceResponse>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    let invoice = InvoiceService::new(state.repo.clone())
        .get_for(&current, id)
        .await?;
    Ok(Json(invoice.into()))
}

/// POST /api/admin/invoices
pub async fn create_invoice<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreateInvoiceRequest>,
) -> BillingResult<(StatusCode, Json<InvoiceResponse>)>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(
        Some(&current),
        Resource::Invoice {
            owner: Some(req.client_id),
        },
        Action::Create,
    )?;
    let invoice = InvoiceService::new(state.repo.clone())
        .create(CreateInvoiceInput {
            client_id: req.client_id,
            project_id: req.project_id,
            description: req.description,
            amount: req.amount,
            currency: req.currency,
            due_date: req.due_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}

/// PATCH /api/admin/invoices/{id}/status
pub async fn update_invoice_status<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<InvoiceId>,
    Json(req): Json<UpdateInvoiceStatusRequest>,
) -> BillingResult<Json<InvoiceResponse>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Invoice { owner: None }, Action::Update)?;
    let status: InvoiceStatus = req.status.parse()?;
    let invoice = InvoiceService::new(state.repo.clone())
        .update_status(id, status)
        .await?;
    Ok(Json(invoice.into()))
}

/// DELETE /api/admin/invoices/{id}
pub async fn delete_invoice<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<InvoiceId>,
) -> BillingResult<StatusCode>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    require(Some(&current), Resource::Invoice { owner: None }, Action::Delete)?;
    InvoiceService::new(state.repo.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Client portal
// ============================================================================

/// GET /api/portal/invoices
pub async fn list_my_invoices<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Query(query): Query<InvoiceListQuery>,
) -> BillingResult<Json<Paginated<InvoiceResponse>>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    let status = parse_invoice_status(query.status.as_deref())?;
    let params = query.list.validate(&INVOICE_LISTING)?;
    let (invoices, total) = InvoiceService::new(state.repo.clone())
        .list_for(&current, status, &params)
        .await?;
    Ok(Json(
        Paginated::new(invoices, total, &params).map(InvoiceResponse::from),
    ))
}

/// GET /api/portal/invoices/{id}
pub async fn get_my_invoice<R>(
    State(state): State<BillingAppState<R>>,
    current: CurrentUser,
    Path(id): Path<InvoiceId>,
) -> BillingResult<Json<InvoiceResponse>>
where
    R: PricingPlanRepository + InvoiceRepository + Clone + Send + Sync + 'static,
{
    let invoice = InvoiceService::new(state.repo.clone())
        .get_for(&current, id)
        .await?;
    Ok(Json(invoice.into()))
}
