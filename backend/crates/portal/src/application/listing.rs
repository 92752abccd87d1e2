//! Listing configurations for portal endpoints

use kernel::pagination::{PaginationConfig, SortField, SortOrder};

const CREATED_AT: SortField = SortField::new("createdAt", "created_at");
const UPDATED_AT: SortField = SortField::new("updatedAt", "updated_at");
const NAME: SortField = SortField::new("name", "name");
const PROGRESS: SortField = SortField::new("progress", "progress");
// `priority_rank` is a generated column ordering low < medium < high < urgent
const PRIORITY: SortField = SortField::new("priority", "priority_rank");

pub const PROJECT_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, UPDATED_AT, NAME, PROGRESS],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["name", "description"],
};

pub const TICKET_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, UPDATED_AT, PRIORITY],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["subject", "message"],
};
