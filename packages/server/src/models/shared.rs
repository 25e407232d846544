use serde::Serialize;

use crate::error::AppError;

/// Default page size for paginated listings.
pub const DEFAULT_PER_PAGE: u64 = 20;
/// Largest page size a client may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Resolve optional page parameters, rejecting out-of-range values.
pub fn validate_page(page: Option<u64>, per_page: Option<u64>) -> Result<(u64, u64), AppError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be >= 1".into()));
    }

    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(AppError::Validation(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }

    // The row offset must fit Postgres' bigint OFFSET.
    if (page - 1)
        .checked_mul(per_page)
        .is_none_or(|offset| offset > i64::MAX as u64)
    {
        return Err(AppError::Validation("page is out of range".into()));
    }

    Ok((page, per_page))
}

/// Validate an optional id filter (must be positive when present).
pub fn validate_optional_id(id: Option<i32>, name: &str) -> Result<Option<i32>, AppError> {
    if let Some(id) = id
        && id < 1
    {
        return Err(AppError::Validation(format!(
            "{name} must be a positive integer"
        )));
    }
    Ok(id)
}
