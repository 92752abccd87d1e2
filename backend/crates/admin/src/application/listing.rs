//! Listing configuration for the user administration endpoint

use kernel::pagination::{PaginationConfig, SortField, SortOrder};

const CREATED_AT: SortField = SortField::new("createdAt", "created_at");
const NAME: SortField = SortField::new("name", "name");
const EMAIL: SortField = SortField::new("email", "email");

pub const USER_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 20,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, NAME, EMAIL],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["name", "email"],
};
