//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{PageId, PostId, TemplateId};
use kernel::pagination::ListParams;
use kernel::slug::Slug;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{page::Page, post::Post, template::Template};
use crate::domain::repository::{PageRepository, PostRepository, TemplateRepository};
use crate::domain::value_object::post_status::PostStatus;
use crate::error::{CmsError, CmsResult};

const PAGE_COLUMNS: &str = "id, title, slug, content, meta_description, created_at, updated_at";
const TEMPLATE_COLUMNS: &str =
    "id, name, category, description, image_url, demo_url, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, slug, content, excerpt, featured_image, status, \
                            published_at, created_at, updated_at";

/// PostgreSQL-backed CMS store, one pool for all three tables
#[derive(Clone)]
pub struct PgCmsRepository {
    pool: PgPool,
}

impl PgCmsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// ` WHERE`/` AND` joiner for optional filters
struct Clauses {
    any: bool,
}

impl Clauses {
    fn new() -> Self {
        Self { any: false }
    }

    fn next<'a>(&mut self, builder: &mut QueryBuilder<'a, Postgres>) {
        builder.push(if self.any { " AND " } else { " WHERE " });
        self.any = true;
    }
}

// ============================================================================
// Pages
// ============================================================================

impl PageRepository for PgCmsRepository {
    async fn create(&self, page: &Page) -> CmsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pages (id, title, slug, content, meta_description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(page.id.as_uuid())
        .bind(&page.title)
        .bind(page.slug.as_str())
        .bind(&page.content)
        .bind(&page.meta_description)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CmsError::from_write(e, page.slug.as_str()))?;
        Ok(())
    }

    async fn update(&self, page: &Page) -> CmsResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pages
            SET title = $2, slug = $3, content = $4, meta_description = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(page.id.as_uuid())
        .bind(&page.title)
        .bind(page.slug.as_str())
        .bind(&page.content)
        .bind(&page.meta_description)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CmsError::from_write(e, page.slug.as_str()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: PageId) -> CmsResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PageRow::into_page))
    }

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PageRow::into_page))
    }

    async fn list(&self, params: &ListParams) -> CmsResult<(Vec<Page>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pages");
        if let Some(search) = &params.search {
            count.push(" WHERE ");
            search.push_sql(&mut count);
        }
        let count: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {PAGE_COLUMNS} FROM pages"));
        if let Some(search) = &params.search {
            query.push(" WHERE ");
            search.push_sql(&mut query);
        }
        params.push_order_and_page(&mut query);
        let rows: Vec<PageRow> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(PageRow::into_page).collect(), total(count)))
    }

    async fn delete(&self, id: PageId) -> CmsResult<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    meta_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PageRow {
    fn into_page(self) -> Page {
        Page {
            id: PageId::from(self.id),
            title: self.title,
            slug: Slug::from_db(self.slug),
            content: self.content,
            meta_description: self.meta_description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

fn push_template_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    category: Option<&'a str>,
    params: &ListParams,
) {
    let mut clauses = Clauses::new();
    if let Some(category) = category {
        clauses.next(builder);
        builder.push("category = ").push_bind(category);
    }
    if let Some(search) = &params.search {
        clauses.next(builder);
        search.push_sql(builder);
    }
}

impl TemplateRepository for PgCmsRepository {
    async fn create(&self, template: &Template) -> CmsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO templates
                (id, name, category, description, image_url, demo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(template.id.as_uuid())
        .bind(&template.name)
        .bind(&template.category)
        .bind(&template.description)
        .bind(&template.image_url)
        .bind(&template.demo_url)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, template: &Template) -> CmsResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE templates
            SET name = $2, category = $3, description = $4, image_url = $5, demo_url = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(template.id.as_uuid())
        .bind(&template.name)
        .bind(&template.category)
        .bind(&template.description)
        .bind(&template.image_url)
        .bind(&template.demo_url)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: TemplateId) -> CmsResult<Option<Template>> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TemplateRow::into_template))
    }

    async fn list(
        &self,
        category: Option<&str>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Template>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM templates");
        push_template_filters(&mut count, category, params);
        let count: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {TEMPLATE_COLUMNS} FROM templates"));
        push_template_filters(&mut query, category, params);
        params.push_order_and_page(&mut query);
        let rows: Vec<TemplateRow> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok((
            rows.into_iter().map(TemplateRow::into_template).collect(),
            total(count),
        ))
    }

    async fn delete(&self, id: TemplateId) -> CmsResult<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    category: String,
    description: Option<String>,
    image_url: Option<String>,
    demo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TemplateRow {
    fn into_template(self) -> Template {
        Template {
            id: TemplateId::from(self.id),
            name: self.name,
            category: self.category,
            description: self.description,
            image_url: self.image_url,
            demo_url: self.demo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ============================================================================
// Posts
// ============================================================================

fn push_post_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    status: Option<PostStatus>,
    params: &ListParams,
) {
    let mut clauses = Clauses::new();
    if let Some(status) = status {
        clauses.next(builder);
        builder.push("status = ").push_bind(status.code());
    }
    if let Some(search) = &params.search {
        clauses.next(builder);
        search.push_sql(builder);
    }
}

impl PostRepository for PgCmsRepository {
    async fn create(&self, post: &Post) -> CmsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, slug, content, excerpt, featured_image, status,
                               published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.featured_image)
        .bind(post.status.code())
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CmsError::from_write(e, post.slug.as_str()))?;
        Ok(())
    }

    async fn update(&self, post: &Post) -> CmsResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, slug = $3, content = $4, excerpt = $5, featured_image = $6,
                status = $7, published_at = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(&post.title)
        .bind(post.slug.as_str())
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.featured_image)
        .bind(post.status.code())
        .bind(post.published_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CmsError::from_write(e, post.slug.as_str()))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: PostId) -> CmsResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(PostRow::into_post).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PostRow::into_post).transpose()
    }

    async fn list(
        &self,
        status: Option<PostStatus>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Post>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_post_filters(&mut count, status, params);
        let count: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {POST_COLUMNS} FROM posts"));
        push_post_filters(&mut query, status, params);
        params.push_order_and_page(&mut query);
        let rows: Vec<PostRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let posts = rows
            .into_iter()
            .map(PostRow::into_post)
            .collect::<CmsResult<Vec<_>>>()?;
        Ok((posts, total(count)))
    }

    async fn delete(&self, id: PostId) -> CmsResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    excerpt: Option<String>,
    featured_image: Option<String>,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> CmsResult<Post> {
        let status = PostStatus::from_code(&self.status).ok_or_else(|| {
            CmsError::Internal(format!("unknown post status in database: {}", self.status))
        })?;
        Ok(Post {
            id: PostId::from(self.id),
            title: self.title,
            slug: Slug::from_db(self.slug),
            content: self.content,
            excerpt: self.excerpt,
            featured_image: self.featured_image,
            status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
