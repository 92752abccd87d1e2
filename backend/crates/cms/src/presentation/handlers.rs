//! HTTP Handlers
//!
//! Public catalog reads and admin content management.

use auth::{Action, CurrentUser, Resource, require};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::id::{PageId, PostId, TemplateId};
use kernel::pagination::{Paginated, RawListQuery};
use std::sync::Arc;

use crate::application::listing::{
    PAGE_LISTING, POST_LISTING, PUBLIC_POST_LISTING, TEMPLATE_LISTING,
};
use crate::application::{
    CreatePageInput, CreatePostInput, CreateTemplateInput, PageService, PostService,
    TemplateService, UpdatePageInput, UpdatePostInput, UpdateTemplateInput,
};
use crate::domain::repository::{PageRepository, PostRepository, TemplateRepository};
use crate::domain::value_object::post_status::PostStatus;
use crate::error::CmsResult;
use crate::presentation::dto::{
    CreatePageRequest, CreatePostRequest, CreateTemplateRequest, PageResponse, PostListQuery,
    PostResponse, TemplateListQuery, TemplateResponse, UpdatePageRequest, UpdatePostRequest,
    UpdateTemplateRequest,
};

/// Shared state for CMS handlers
#[derive(Clone)]
pub struct CmsAppState<R>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

fn parse_status(raw: Option<&str>) -> CmsResult<Option<PostStatus>> {
    Ok(raw.map(str::parse::<PostStatus>).transpose()?)
}

fn allow(user: &CurrentUser, action: Action) -> CmsResult<()> {
    Ok(require(Some(user), Resource::Content, action)?)
}

// ============================================================================
// Public
// ============================================================================

/// GET /api/pages
pub async fn list_pages<R>(
    State(state): State<CmsAppState<R>>,
    Query(query): Query<RawListQuery>,
) -> CmsResult<Json<Paginated<PageResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let params = query.validate(&PAGE_LISTING)?;
    let (pages, total) = PageService::new(state.repo.clone()).list(&params).await?;
    Ok(Json(Paginated::new(pages, total, &params).map(PageResponse::from)))
}

/// GET /api/pages/{slug}
pub async fn get_page_by_slug<R>(
    State(state): State<CmsAppState<R>>,
    Path(slug): Path<String>,
) -> CmsResult<Json<PageResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let page = PageService::new(state.repo.clone()).get_by_slug(&slug).await?;
    Ok(Json(page.into()))
}

/// GET /api/templates
pub async fn list_templates<R>(
    State(state): State<CmsAppState<R>>,
    Query(query): Query<TemplateListQuery>,
) -> CmsResult<Json<Paginated<TemplateResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let params = query.list.validate(&TEMPLATE_LISTING)?;
    let (templates, total) = TemplateService::new(state.repo.clone())
        .list(query.category.as_deref(), &params)
        .await?;
    Ok(Json(
        Paginated::new(templates, total, &params).map(TemplateResponse::from),
    ))
}

/// GET /api/templates/{id}
pub async fn get_template<R>(
    State(state): State<CmsAppState<R>>,
    Path(id): Path<TemplateId>,
) -> CmsResult<Json<TemplateResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let template = TemplateService::new(state.repo.clone()).get(id).await?;
    Ok(Json(template.into()))
}

/// GET /api/blog/posts
pub async fn list_published_posts<R>(
    State(state): State<CmsAppState<R>>,
    Query(query): Query<RawListQuery>,
) -> CmsResult<Json<Paginated<PostResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let params = query.validate(&PUBLIC_POST_LISTING)?;
    let (posts, total) = PostService::new(state.repo.clone())
        .list_published(&params)
        .await?;
    Ok(Json(Paginated::new(posts, total, &params).map(PostResponse::from)))
}

/// GET /api/blog/posts/{slug}
pub async fn get_published_post<R>(
    State(state): State<CmsAppState<R>>,
    Path(slug): Path<String>,
) -> CmsResult<Json<PostResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    let post = PostService::new(state.repo.clone())
        .get_published(&slug)
        .await?;
    Ok(Json(post.into()))
}

// ============================================================================
// Admin: pages
// ============================================================================

/// GET /api/admin/pages
pub async fn admin_list_pages<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Query(query): Query<RawListQuery>,
) -> CmsResult<Json<Paginated<PageResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Read)?;
    let params = query.validate(&PAGE_LISTING)?;
    let (pages, total) = PageService::new(state.repo.clone()).list(&params).await?;
    Ok(Json(Paginated::new(pages, total, &params).map(PageResponse::from)))
}

/// GET /api/admin/pages/{id}
pub async fn admin_get_page<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PageId>,
) -> CmsResult<Json<PageResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Read)?;
    let page = PageService::new(state.repo.clone()).get(id).await?;
    Ok(Json(page.into()))
}

/// POST /api/admin/pages
pub async fn create_page<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreatePageRequest>,
) -> CmsResult<(StatusCode, Json<PageResponse>)>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Create)?;
    let page = PageService::new(state.repo.clone())
        .create(CreatePageInput {
            title: req.title,
            slug: req.slug,
            content: req.content,
            meta_description: req.meta_description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(page.into())))
}

/// PUT /api/admin/pages/{id}
pub async fn update_page<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PageId>,
    Json(req): Json<UpdatePageRequest>,
) -> CmsResult<Json<PageResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Update)?;
    let page = PageService::new(state.repo.clone())
        .update(
            id,
            UpdatePageInput {
                title: req.title,
                slug: req.slug,
                content: req.content,
                meta_description: req.meta_description,
            },
        )
        .await?;
    Ok(Json(page.into()))
}

/// DELETE /api/admin/pages/{id}
pub async fn delete_page<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PageId>,
) -> CmsResult<StatusCode>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Delete)?;
    PageService::new(state.repo.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: templates
// ============================================================================

/// GET /api/admin/templates
pub async fn admin_list_templates<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Query(query): Query<TemplateListQuery>,
) -> CmsResult<Json<Paginated<TemplateResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Read)?;
    let params = query.list.validate(&TEMPLATE_LISTING)?;
    let (templates, total) = TemplateService::new(state.repo.clone())
        .list(query.category.as_deref(), &params)
        .await?;
    Ok(Json(
        Paginated::new(templates, total, &params).map(TemplateResponse::from),
    ))
}

/// POST /api/admin/templates
pub async fn create_template<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreateTemplateRequest>,
) -> CmsResult<(StatusCode, Json<TemplateResponse>)>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Create)?;
    let template = TemplateService::new(state.repo.clone())
        .create(CreateTemplateInput {
            name: req.name,
            category: req.category,
            description: req.description,
            image_url: req.image_url,
            demo_url: req.demo_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

/// PUT /api/admin/templates/{id}
pub async fn update_template<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<TemplateId>,
    Json(req): Json<UpdateTemplateRequest>,
) -> CmsResult<Json<TemplateResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Update)?;
    let template = TemplateService::new(state.repo.clone())
        .update(
            id,
            UpdateTemplateInput {
                name: req.name,
                category: req.category,
                description: req.description,
                image_url: req.image_url,
                demo_url: req.demo_url,
            },
        )
        .await?;
    Ok(Json(template.into()))
}

/// DELETE /api/admin/templates/{id}
pub async fn delete_template<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<TemplateId>,
) -> CmsResult<StatusCode>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Delete)?;
    TemplateService::new(state.repo.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: posts
// ============================================================================

/// GET /api/admin/posts
pub async fn admin_list_posts<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Query(query): Query<PostListQuery>,
) -> CmsResult<Json<Paginated<PostResponse>>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Read)?;
    let status = parse_status(query.status.as_deref())?;
    let params = query.list.validate(&POST_LISTING)?;
    let (posts, total) = PostService::new(state.repo.clone())
        .list(status, &params)
        .await?;
    Ok(Json(Paginated::new(posts, total, &params).map(PostResponse::from)))
}

/// GET /api/admin/posts/{id}
pub async fn admin_get_post<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PostId>,
) -> CmsResult<Json<PostResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Read)?;
    let post = PostService::new(state.repo.clone()).get(id).await?;
    Ok(Json(post.into()))
}

/// POST /api/admin/posts
pub async fn create_post<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> CmsResult<(StatusCode, Json<PostResponse>)>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Create)?;
    let post = PostService::new(state.repo.clone())
        .create(CreatePostInput {
            status: parse_status(req.status.as_deref())?,
            title: req.title,
            slug: req.slug,
            content: req.content,
            excerpt: req.excerpt,
            featured_image: req.featured_image,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// PUT /api/admin/posts/{id}
pub async fn update_post<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PostId>,
    Json(req): Json<UpdatePostRequest>,
) -> CmsResult<Json<PostResponse>>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Update)?;
    let post = PostService::new(state.repo.clone())
        .update(
            id,
            UpdatePostInput {
                status: parse_status(req.status.as_deref())?,
                title: req.title,
                slug: req.slug,
                content: req.content,
                excerpt: req.excerpt,
                featured_image: req.featured_image,
            },
        )
        .await?;
    Ok(Json(post.into()))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post<R>(
    State(state): State<CmsAppState<R>>,
    current: CurrentUser,
    Path(id): Path<PostId>,
) -> CmsResult<StatusCode>
where
    R: PageRepository + TemplateRepository + PostRepository + Clone + Send + Sync + 'static,
{
    allow(&current, Action::Delete)?;
    PostService::new(state.repo.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
