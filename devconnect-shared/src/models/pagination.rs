/// Offset pagination shared by list endpoints
///
/// Lists are paged with `page` (1-based) and `limit` query parameters.
/// Responses wrap the items with a `pagination` block:
///
/// ```json
/// {
///   "items": [...],
///   "pagination": { "currentPage": 2, "totalPages": 5, "totalItems": 42, "hasMore": true }
/// }
/// ```

use serde::{Deserialize, Serialize};

/// Default page size when `limit` is absent
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 100;

/// Page request parsed from the query string
///
/// Out-of-range values are clamped: `page < 1` becomes 1 and `limit` is kept
/// within `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    /// Creates clamped page parameters
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }.normalized()
    }

    /// Returns a copy with page and limit clamped into range
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip: `(page - 1) * limit`, saturating at `i64::MAX`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned alongside a page of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_more: bool,
}

impl PaginationMeta {
    /// Computes metadata for a page holding `returned` of `total` items
    pub fn new(params: PageParams, total: i64, returned: usize) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.saturating_add(params.limit - 1) / params.limit
        };

        Self {
            current_page: params.page,
            total_pages,
            total_items: total,
            has_more: params.offset().saturating_add(returned as i64) < total,
        }
    }
}

/// A page of items plus its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: i64) -> Self {
        let pagination = PaginationMeta::new(params, total, items.len());
        Self { items, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_missing_fields_uses_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, PageParams::default());

        let params: PageParams = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn test_clamping() {
        let params = PageParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);

        let params = PageParams::new(-4, 5000);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageParams::new(3, 10).offset(), 20);
        assert_eq!(PageParams::new(2, 25).offset(), 25);
    }

    #[test]
    fn test_huge_page_saturates() {
        let params = PageParams::new(i64::MAX, 10);
        assert_eq!(params.offset(), i64::MAX);

        let meta = PaginationMeta::new(params, 42, 0);
        assert_eq!(meta.current_page, i64::MAX);
        assert_eq!(meta.total_pages, 5);
        assert!(!meta.has_more);

        let meta = PaginationMeta::new(PageParams::new(1, MAX_LIMIT), i64::MAX, 100);
        assert!(meta.has_more);
    }

    #[test]
    fn test_meta_middle_page() {
        let meta = PaginationMeta::new(PageParams::new(2, 10), 42, 10);

        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.total_pages, 5);
        assert_eq!(meta.total_items, 42);
        assert!(meta.has_more);
    }

    #[test]
    fn test_meta_last_page() {
        let meta = PaginationMeta::new(PageParams::new(5, 10), 42, 2);

        assert_eq!(meta.total_pages, 5);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_empty() {
        let meta = PaginationMeta::new(PageParams::default(), 0, 0);

        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let page = PaginatedResponse::new(vec![1, 2], PageParams::new(1, 2), 3);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "items": [1, 2],
                "pagination": {
                    "currentPage": 1,
                    "totalPages": 2,
                    "totalItems": 3,
                    "hasMore": true
                }
            })
        );
    }
}
