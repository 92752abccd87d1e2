//! Listing configurations for billing endpoints

use kernel::pagination::{PaginationConfig, SortField, SortOrder};

const CREATED_AT: SortField = SortField::new("createdAt", "created_at");
const NAME: SortField = SortField::new("name", "name");
const PRICE: SortField = SortField::new("price", "price");
const SORT_ORDER: SortField = SortField::new("sortOrder", "sort_order");
const AMOUNT: SortField = SortField::new("amount", "amount");
const DUE_DATE: SortField = SortField::new("dueDate", "due_date");

pub const PLAN_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 20,
    max_limit: 100,
    allowed_sort_fields: &[SORT_ORDER, CREATED_AT, NAME, PRICE],
    default_sort: SORT_ORDER,
    default_sort_order: SortOrder::Asc,
    search_fields: &["name", "description"],
};

pub const INVOICE_LISTING: PaginationConfig = PaginationConfig {
    default_limit: 10,
    max_limit: 100,
    allowed_sort_fields: &[CREATED_AT, AMOUNT, DUE_DATE],
    default_sort: CREATED_AT,
    default_sort_order: SortOrder::Desc,
    search_fields: &["number", "description"],
};
