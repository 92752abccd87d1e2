//! Repository Traits

use kernel::id::{PageId, PostId, TemplateId};
use kernel::pagination::ListParams;

use crate::domain::entity::{page::Page, post::Post, template::Template};
use crate::domain::value_object::post_status::PostStatus;
use crate::error::CmsResult;

#[trait_variant::make(PageRepository: Send)]
pub trait LocalPageRepository {
    /// Fails with `SlugTaken` on a duplicate slug
    async fn create(&self, page: &Page) -> CmsResult<()>;

    /// Persist changes. `false` if the page no longer exists.
    async fn update(&self, page: &Page) -> CmsResult<bool>;

    async fn find_by_id(&self, id: PageId) -> CmsResult<Option<Page>>;

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Page>>;

    async fn list(&self, params: &ListParams) -> CmsResult<(Vec<Page>, u64)>;

    async fn delete(&self, id: PageId) -> CmsResult<bool>;
}

#[trait_variant::make(TemplateRepository: Send)]
pub trait LocalTemplateRepository {
    async fn create(&self, template: &Template) -> CmsResult<()>;

    async fn update(&self, template: &Template) -> CmsResult<bool>;

    async fn find_by_id(&self, id: TemplateId) -> CmsResult<Option<Template>>;

    /// One page of templates, optionally restricted to a category
    async fn list(
        &self,
        category: Option<&str>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Template>, u64)>;

    async fn delete(&self, id: TemplateId) -> CmsResult<bool>;
}

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Fails with `SlugTaken` on a duplicate slug
    async fn create(&self, post: &Post) -> CmsResult<()>;

    async fn update(&self, post: &Post) -> CmsResult<bool>;

    async fn find_by_id(&self, id: PostId) -> CmsResult<Option<Post>>;

    async fn find_by_slug(&self, slug: &str) -> CmsResult<Option<Post>>;

    /// One page of posts, optionally restricted to a status
    async fn list(
        &self,
        status: Option<PostStatus>,
        params: &ListParams,
    ) -> CmsResult<(Vec<Post>, u64)>;

    async fn delete(&self, id: PostId) -> CmsResult<bool>;
}
