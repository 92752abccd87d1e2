//! Pagination / Query Service
//!
//! Validates raw listing query parameters against a per-endpoint
//! [`PaginationConfig`], builds substring-search predicates over a chosen set
//! of fields, and shapes the `{ data, pagination }` envelope returned by
//! every listing endpoint.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::app_error::{AppError, AppResult};

/// Longest accepted search term, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// A sortable field: the name clients send and the column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub name: &'static str,
    pub column: &'static str,
}

impl SortField {
    pub const fn new(name: &'static str, column: &'static str) -> Self {
        Self { name, column }
    }
}

/// Per-endpoint listing configuration
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub allowed_sort_fields: &'static [SortField],
    /// Must be one of `allowed_sort_fields`
    pub default_sort: SortField,
    pub default_sort_order: SortOrder,
    /// Columns searched by the `search` parameter
    pub search_fields: &'static [&'static str],
}

const CREATED_AT: SortField = SortField::new("createdAt", "created_at");

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            allowed_sort_fields: &[CREATED_AT],
            default_sort: CREATED_AT,
            default_sort_order: SortOrder::Desc,
            search_fields: &[],
        }
    }
}

/// Query parameters exactly as received
///
/// Everything is a string so that malformed numbers surface as a
/// validation error with a useful message rather than a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

/// Validated pagination/sort/search descriptor
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub sort_order: SortOrder,
    pub search: Option<SearchPredicate>,
}

impl ListParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// First page with the config defaults.
    pub fn first_page(config: &PaginationConfig) -> Self {
        Self {
            page: 1,
            limit: config.default_limit,
            sort: config.default_sort,
            sort_order: config.default_sort_order,
            search: None,
        }
    }

    /// Append `ORDER BY <sort>, id LIMIT $n OFFSET $m` to a query.
    ///
    /// `id` breaks ties so pages never overlap.
    #[cfg(feature = "sqlx")]
    pub fn push_order_and_page(&self, builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        let order = self.sort_order.as_sql();
        builder
            .push(" ORDER BY ")
            .push(self.sort.column)
            .push(" ")
            .push(order)
            .push(", id ")
            .push(order);
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(self.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(self.offset()).unwrap_or(i64::MAX));
    }

    /// Slice an already-filtered, already-sorted collection.
    ///
    /// Returns the requested page and the total count before slicing.
    pub fn slice<T>(&self, items: Vec<T>) -> (Vec<T>, u64) {
        let total = items.len() as u64;
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let page = items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect();
        (page, total)
    }
}

impl RawListQuery {
    /// Validate against `config`.
    pub fn validate(&self, config: &PaginationConfig) -> AppResult<ListParams> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| AppError::bad_request("page must be an integer"))?;
                if value < 1 {
                    return Err(AppError::bad_request("page must be greater than or equal to 1"));
                }
                u32::try_from(value).map_err(|_| AppError::bad_request("page is too large"))?
            }
        };

        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => config.default_limit,
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| AppError::bad_request("limit must be an integer"))?;
                if value < 1 {
                    return Err(AppError::bad_request("limit must be greater than or equal to 1"));
                }
                if value > i64::from(config.max_limit) {
                    return Err(AppError::bad_request(format!(
                        "limit must not exceed {}",
                        config.max_limit
                    )));
                }
                value as u32
            }
        };

        let sort = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => config.default_sort,
            Some(raw) => config
                .allowed_sort_fields
                .iter()
                .find(|field| field.name == raw)
                .copied()
                .ok_or_else(|| {
                    let allowed: Vec<&str> =
                        config.allowed_sort_fields.iter().map(|f| f.name).collect();
                    AppError::bad_request(format!("sortBy must be one of: {}", allowed.join(", ")))
                })?,
        };

        let sort_order = match self.sort_order.as_deref().map(str::trim) {
            None | Some("") => config.default_sort_order,
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| AppError::bad_request("sortOrder must be 'asc' or 'desc'"))?,
        };

        let search = match self.search.as_deref() {
            Some(term) if term.chars().count() > MAX_SEARCH_LENGTH => {
                return Err(AppError::bad_request(format!(
                    "search must be at most {} characters",
                    MAX_SEARCH_LENGTH
                )));
            }
            Some(term) => SearchPredicate::new(term, config.search_fields),
            None => None,
        };

        Ok(ListParams {
            page,
            limit,
            sort,
            sort_order,
            search,
        })
    }
}

// ============================================================================
// Search
// ============================================================================

/// Record whose text fields can be looked up by column name.
pub trait Searchable {
    fn search_field(&self, column: &str) -> Option<&str>;
}

/// Case-insensitive substring match over a list of columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPredicate {
    term: String,
    fields: &'static [&'static str],
}

impl SearchPredicate {
    /// `None` when the term is blank or there is nothing to search.
    pub fn new(term: &str, fields: &'static [&'static str]) -> Option<Self> {
        let term = term.trim();
        if term.is_empty() || fields.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_lowercase(),
            fields,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// True if any configured field contains the term.
    pub fn matches<S: Searchable + ?Sized>(&self, record: &S) -> bool {
        self.fields.iter().any(|column| {
            record
                .search_field(column)
                .is_some_and(|value| value.to_lowercase().contains(&self.term))
        })
    }

    /// `%term%` with LIKE wildcards escaped.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.term.len() + 2);
        pattern.push('%');
        for c in self.term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    /// Append `(a ILIKE $n OR b ILIKE $n ...)` to a query.
    #[cfg(feature = "sqlx")]
    pub fn push_sql(&self, builder: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>) {
        let pattern = self.like_pattern();
        builder.push("(");
        for (i, column) in self.fields.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push(*column);
            builder.push(" ILIKE ");
            builder.push_bind(pattern.clone());
        }
        builder.push(")");
    }
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: u64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}

/// `{ data, pagination }`
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, params: &ListParams) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params.page, params.limit, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: SortField = SortField::new("title", "title");
    const FIELDS: &[SortField] = &[CREATED_AT, TITLE];

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 50,
            allowed_sort_fields: FIELDS,
            default_sort: CREATED_AT,
            default_sort_order: SortOrder::Desc,
            search_fields: &["title", "content"],
        }
    }

    fn raw(page: Option<&str>, limit: Option<&str>) -> RawListQuery {
        RawListQuery {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..Default::default()
        }
    }

    struct Doc {
        title: String,
        content: String,
    }

    impl Searchable for Doc {
        fn search_field(&self, column: &str) -> Option<&str> {
            match column {
                "title" => Some(&self.title),
                "content" => Some(&self.content),
                _ => None,
            }
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let params = RawListQuery::default().validate(&config()).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.sort, CREATED_AT);
        assert_eq!(params.sort_order, SortOrder::Desc);
        assert!(params.search.is_none());
    }

    #[test]
    fn test_rejects_page_below_one() {
        let err = raw(Some("0"), None).validate(&config()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(raw(Some("-3"), None).validate(&config()).is_err());
    }

    #[test]
    fn test_rejects_limit_out_of_range() {
        assert!(raw(None, Some("0")).validate(&config()).is_err());
        assert!(raw(None, Some("51")).validate(&config()).is_err());
        assert_eq!(raw(None, Some("50")).validate(&config()).unwrap().limit, 50);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = raw(Some("two"), None).validate(&config()).unwrap_err();
        assert_eq!(err.message(), "page must be an integer");
        assert!(raw(None, Some("1.5")).validate(&config()).is_err());
    }

    #[test]
    fn test_normalizes_valid_values() {
        let params = raw(Some(" 3 "), Some("20")).validate(&config()).unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 20);
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_sort_validation() {
        let mut q = RawListQuery {
            sort_by: Some("title".into()),
            sort_order: Some("ASC".into()),
            ..Default::default()
        };
        let params = q.validate(&config()).unwrap();
        assert_eq!(params.sort.column, "title");
        assert_eq!(params.sort_order, SortOrder::Asc);

        q.sort_by = Some("password".into());
        assert!(q.validate(&config()).is_err());

        q.sort_by = None;
        q.sort_order = Some("sideways".into());
        assert!(q.validate(&config()).is_err());
    }

    #[test]
    fn test_search_predicate_matches_any_field() {
        let q = RawListQuery {
            search: Some("  Rust ".into()),
            ..Default::default()
        };
        let search = q.validate(&config()).unwrap().search.unwrap();
        assert_eq!(search.term(), "rust");

        let hit = Doc {
            title: "Hello".into(),
            content: "Learning RUST daily".into(),
        };
        let miss = Doc {
            title: "Hello".into(),
            content: "Go".into(),
        };
        assert!(search.matches(&hit));
        assert!(!search.matches(&miss));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert!(SearchPredicate::new("   ", &["title"]).is_none());
        assert!(SearchPredicate::new("x", &[]).is_none());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let p = SearchPredicate::new("50%_off\\", &["title"]).unwrap();
        assert_eq!(p.like_pattern(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_envelope_meta() {
        let params = raw(Some("2"), Some("10")).validate(&config()).unwrap();
        let page = Paginated::new(vec![1, 2, 3], 23, &params);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pagination"]["totalPages"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_slice_returns_total_before_paging() {
        let params = raw(Some("2"), Some("2")).validate(&config()).unwrap();
        let (items, total) = params.slice(vec!['a', 'b', 'c', 'd', 'e']);
        assert_eq!(items, vec!['c', 'd']);
        assert_eq!(total, 5);
    }
}
