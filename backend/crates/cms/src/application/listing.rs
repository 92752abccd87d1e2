//! Listing configurations for CMS endpoints

use kernel::pagination::{PaginationConfig, SortField, SortOrder};

const CREATED_AT: SortField = SortField::new("createdAt", "created_at");
const UPDATED_AT: SortField = SortField::new("updatedAt", "updated_at");
const TITLE: SortField = SortField::new("title", "title");
const NAME: SortField = SortField::new("name", "name");
const PUBLISHED_AT: SortField = SortField::new("publishedAt", "published_at");

pub const PAGE_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, UPDATED_AT, TITLE],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["title", "content"],
};

pub const TEMPLATE_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 12,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, NAME],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["name", "description"],
};

pub const POST_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, UPDATED_AT, PUBLISHED_AT, TITLE],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["title", "content", "excerpt"],
};

/// Public blog listing: newest publication first
pub const PUBLIC_POST_LISTING: PaginationConfig = PaginationConfig {
    default_sort: PUBLISHED_AT,
    ..POST_LISTING
};
