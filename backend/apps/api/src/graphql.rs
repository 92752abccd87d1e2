//! GraphQL Endpoint
//!
//! A read-only view of the public catalog: pages, published posts and
//! active pricing plans. Every HTTP verb reaches [`graphql_handler`]; GET
//! carries the operation in the query string, everything else in a JSON
//! body.

use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject,
    Variables,
};
use async_trait::async_trait;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::Method;
use billing::{PricingPlan, PricingPlanRepository, PricingPlanService};
use chrono::{DateTime, Utc};
use cms::application::listing::{PAGE_LISTING, PUBLIC_POST_LISTING};
use cms::{Page, PageRepository, PageService, Post, PostRepository, PostService};
use kernel::error::app_error::{AppError, AppResult};
use kernel::error::kind::ErrorKind;
use kernel::pagination::{ListParams, PaginationConfig};
use serde::Deserialize;

pub type JasaSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Read side of the catalog the query root resolves against
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn pages(&self, limit: u32) -> AppResult<Vec<Page>>;
    async fn page(&self, slug: &str) -> AppResult<Option<Page>>;
    async fn published_posts(&self, limit: u32) -> AppResult<Vec<Post>>;
    async fn active_plans(&self) -> AppResult<Vec<PricingPlan>>;
}

/// [`Catalog`] backed by the CMS and billing services
pub struct ServiceCatalog<C, B>
where
    C: PageRepository + PostRepository,
    B: PricingPlanRepository,
{
    pages: PageService<C>,
    posts: PostService<C>,
    plans: PricingPlanService<B>,
}

impl<C, B> ServiceCatalog<C, B>
where
    C: PageRepository + PostRepository,
    B: PricingPlanRepository,
{
    pub fn new(cms: Arc<C>, billing: Arc<B>) -> Self {
        Self {
            pages: PageService::new(cms.clone()),
            posts: PostService::new(cms),
            plans: PricingPlanService::new(billing),
        }
    }
}

fn first_page(config: &PaginationConfig, limit: u32) -> ListParams {
    ListParams {
        limit,
        ..ListParams::first_page(config)
    }
}

#[async_trait]
impl<C, B> Catalog for ServiceCatalog<C, B>
where
    C: PageRepository + PostRepository + Send + Sync + 'static,
    B: PricingPlanRepository + Send + Sync + 'static,
{
    async fn pages(&self, limit: u32) -> AppResult<Vec<Page>> {
        let (pages, _) = self.pages.list(&first_page(&PAGE_LISTING, limit)).await?;
        Ok(pages)
    }

    async fn page(&self, slug: &str) -> AppResult<Option<Page>> {
        match self.pages.get_by_slug(slug).await.map_err(AppError::from) {
            Ok(page) => Ok(Some(page)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn published_posts(&self, limit: u32) -> AppResult<Vec<Post>> {
        let params = first_page(&PUBLIC_POST_LISTING, limit);
        let (posts, _) = self.posts.list_published(&params).await?;
        Ok(posts)
    }

    async fn active_plans(&self) -> AppResult<Vec<PricingPlan>> {
        Ok(self.plans.list_active().await?)
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Page")]
pub struct PageObject {
    id: String,
    title: String,
    slug: String,
    content: String,
    meta_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Page> for PageObject {
    fn from(page: Page) -> Self {
        Self {
            id: page.id.to_string(),
            title: page.title,
            slug: page.slug.to_string(),
            content: page.content,
            meta_description: page.meta_description,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Post")]
pub struct PostObject {
    id: String,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    featured_image: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

impl From<Post> for PostObject {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            slug: post.slug.to_string(),
            content: post.content,
            excerpt: post.excerpt,
            featured_image: post.featured_image,
            published_at: post.published_at,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(name = "PricingPlan")]
pub struct PricingPlanObject {
    id: String,
    name: String,
    slug: String,
    description: Option<String>,
    /// Minor units (IDR)
    price: i64,
    billing_period: String,
    features: Vec<String>,
    is_popular: bool,
}

impl From<PricingPlan> for PricingPlanObject {
    fn from(plan: PricingPlan) -> Self {
        Self {
            id: plan.id.to_string(),
            name: plan.name,
            slug: plan.slug.to_string(),
            description: plan.description,
            price: plan.price,
            billing_period: plan.billing_period.to_string(),
            features: plan.features,
            is_popular: plan.is_popular,
        }
    }
}

fn gql_error(err: AppError) -> async_graphql::Error {
    err.log();
    let code = err.kind().to_string();
    async_graphql::Error::new(err.public_message()).extend_with(move |_, ext| ext.set("code", code))
}

fn catalog<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn Catalog>> {
    ctx.data::<Arc<dyn Catalog>>()
}

/// Out-of-range limits are clamped rather than rejected
fn clamp_limit(limit: i32, config: &PaginationConfig) -> u32 {
    u32::try_from(limit)
        .unwrap_or(1)
        .clamp(1, config.max_limit)
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self) -> &'static str {
        "ok"
    }

    /// Newest pages first
    async fn pages(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 10)] limit: i32,
    ) -> async_graphql::Result<Vec<PageObject>> {
        let pages = catalog(ctx)?
            .pages(clamp_limit(limit, &PAGE_LISTING))
            .await
            .map_err(gql_error)?;
        Ok(pages.into_iter().map(PageObject::from).collect())
    }

    async fn page(
        &self,
        ctx: &Context<'_>,
        slug: String,
    ) -> async_graphql::Result<Option<PageObject>> {
        let page = catalog(ctx)?.page(&slug).await.map_err(gql_error)?;
        Ok(page.map(PageObject::from))
    }

    /// Published posts, newest publication first
    async fn posts(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 10)] limit: i32,
    ) -> async_graphql::Result<Vec<PostObject>> {
        let posts = catalog(ctx)?
            .published_posts(clamp_limit(limit, &PUBLIC_POST_LISTING))
            .await
            .map_err(gql_error)?;
        Ok(posts.into_iter().map(PostObject::from).collect())
    }

    async fn pricing_plans(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<PricingPlanObject>> {
        let plans = catalog(ctx)?.active_plans().await.map_err(gql_error)?;
        Ok(plans.into_iter().map(PricingPlanObject::from).collect())
    }
}

pub fn build_schema(catalog: Arc<dyn Catalog>) -> JasaSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(catalog)
        .finish()
}

/// Operation fields of a GET request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlParams {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    /// JSON-encoded object
    pub variables: Option<String>,
}

fn request_from_params(params: GraphQlParams) -> AppResult<async_graphql::Request> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Missing 'query' parameter"))?;

    let mut request = async_graphql::Request::new(query);
    if let Some(name) = params.operation_name {
        request = request.operation_name(name);
    }
    if let Some(raw) = params.variables.filter(|v| !v.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            AppError::bad_request("'variables' must be a JSON object").with_source(e)
        })?;
        request = request.variables(Variables::from_json(value));
    }
    Ok(request)
}

/// ANY /api/graphql
pub async fn graphql_handler(
    State(schema): State<JasaSchema>,
    method: Method,
    Query(params): Query<GraphQlParams>,
    body: Bytes,
) -> AppResult<Json<async_graphql::Response>> {
    let request = if method == Method::GET {
        request_from_params(params)?
    } else {
        serde_json::from_slice::<async_graphql::Request>(&body).map_err(|e| {
            AppError::bad_request("Request body must be a GraphQL JSON document").with_source(e)
        })?
    };

    let response = schema.execute(request).await;
    if response.is_err() {
        tracing::debug!(errors = response.errors.len(), "GraphQL request returned errors");
    }
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(5, &PAGE_LISTING), 5);
        assert_eq!(clamp_limit(0, &PAGE_LISTING), 1);
        assert_eq!(clamp_limit(-3, &PAGE_LISTING), 1);
        assert_eq!(clamp_limit(10_000, &PAGE_LISTING), PAGE_LISTING.max_limit);
    }

    #[test]
    fn test_get_params_require_query() {
        let err = request_from_params(GraphQlParams::default()).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = request_from_params(GraphQlParams {
            query: Some("{ health }".to_string()),
            variables: Some("not json".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let ok = request_from_params(GraphQlParams {
            query: Some("query Q($n: Int) { pages(limit: $n) { id } }".to_string()),
            operation_name: Some("Q".to_string()),
            variables: Some(r#"{"n": 2}"#.to_string()),
        });
        assert!(ok.is_ok());
    }
}
