//! Pagination, search and ordering input for a listing call.
//!
//! A [`PageSpec`] is built from untrusted request input. It never rejects
//! anything: a page below 1 becomes 1 and a limit outside `[1, max_limit]`
//! becomes the default limit.

use listq_core::settings::{PaginationSettings, DEFAULT_LIMIT, MAX_LIMIT};
use serde::{Deserialize, Serialize};

/// Raw pagination, search and ordering request.
///
/// Deserializes from the usual query-string names: `page`, `limit` (or
/// `page_size`), `search_key` (or `key`), and `order_expr` (or `order`).
/// Missing fields take their zero value and normalize like any other
/// out-of-range input.
///
/// # Examples
///
/// ```
/// use listq_db::query::page::PageSpec;
///
/// let mut spec = PageSpec::new(0, 500);
/// spec.normalize();
/// assert_eq!(spec.page, 1);
/// assert_eq!(spec.limit, 10);
/// assert_eq!(spec.offset(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    #[serde(alias = "page_size")]
    pub limit: i64,
    /// Fuzzy search term. Empty means no fuzzy filter.
    #[serde(alias = "key")]
    pub search_key: String,
    /// Caller ordering, e.g. `"title asc, created_at desc"`. Empty means use
    /// the listing's default.
    #[serde(alias = "order")]
    pub order_expr: String,
    #[serde(skip)]
    bounds: PaginationSettings,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: 0,
            limit: 0,
            search_key: String::new(),
            order_expr: String::new(),
            bounds: PaginationSettings::default(),
        }
    }
}

impl PageSpec {
    /// Creates a page request for the given page and limit, with no search or order.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    /// Sets the fuzzy search term.
    #[must_use]
    pub fn with_search(mut self, key: impl Into<String>) -> Self {
        self.search_key = key.into();
        self
    }

    /// Sets the ordering expression.
    #[must_use]
    pub fn with_order(mut self, expr: impl Into<String>) -> Self {
        self.order_expr = expr.into();
        self
    }

    /// Clamps `page` and `limit` into range using the default bounds
    /// (default limit 10, max limit 100). Idempotent.
    pub fn normalize(&mut self) {
        self.normalize_with(&PaginationSettings::default());
    }

    /// Clamps `page` and `limit` into range using the given bounds.
    ///
    /// The bounds are remembered, so [`limit`](Self::limit) and
    /// [`offset`](Self::offset) agree with the stored fields afterwards.
    pub fn normalize_with(&mut self, settings: &PaginationSettings) {
        self.bounds = settings.clone();
        self.page = self.page();
        self.limit = self.limit();
    }

    /// The normalized page number, `>= 1`.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// The normalized page size, in `[1, max_limit]`.
    pub fn limit(&self) -> i64 {
        let (default_limit, max_limit) = self.effective_bounds();
        if (1..=max_limit).contains(&self.limit) {
            self.limit
        } else {
            default_limit
        }
    }

    /// The row offset of the first item on the normalized page.
    ///
    /// Saturates at `i64::MAX` instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Returns `true` if a fuzzy search term was supplied.
    pub fn has_search(&self) -> bool {
        !self.search_key.is_empty()
    }

    fn effective_bounds(&self) -> (i64, i64) {
        let max_limit = if self.bounds.max_limit >= 1 {
            self.bounds.max_limit
        } else {
            MAX_LIMIT
        };
        let default_limit = if (1..=max_limit).contains(&self.bounds.default_limit) {
            self.bounds.default_limit
        } else {
            DEFAULT_LIMIT.min(max_limit)
        };
        (default_limit, max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_below_one_clamped() {
        for page in [i64::MIN, -5, 0] {
            let mut spec = PageSpec::new(page, 10);
            spec.normalize();
            assert_eq!(spec.page, 1, "page {page}");
        }
    }

    #[test]
    fn test_limit_out_of_range_reset() {
        for limit in [i64::MIN, -1, 0, 101, 1000, i64::MAX] {
            let mut spec = PageSpec::new(1, limit);
            spec.normalize();
            assert_eq!(spec.limit, 10, "limit {limit}");
        }
    }

    #[test]
    fn test_limit_in_range_kept() {
        for limit in [1, 10, 50, 100] {
            let mut spec = PageSpec::new(1, limit);
            spec.normalize();
            assert_eq!(spec.limit, limit);
        }
    }

    #[test]
    fn test_offset() {
        let mut spec = PageSpec::new(3, 20);
        spec.normalize();
        assert_eq!(spec.offset(), 40);
        assert_eq!(PageSpec::new(1, 20).offset(), 0);
    }

    #[test]
    fn test_accessors_without_normalize() {
        let spec = PageSpec::new(-2, 0);
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.limit(), 10);
        assert_eq!(spec.offset(), 0);
        assert_eq!(spec.page, -2);
    }

    #[test]
    fn test_offset_saturates() {
        let spec = PageSpec::new(i64::MAX, 100);
        assert_eq!(spec.offset(), i64::MAX);
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut spec = PageSpec::new(0, 0);
        spec.normalize();
        let once = spec.clone();
        spec.normalize();
        assert_eq!(spec, once);
    }

    #[test]
    fn test_normalize_with_custom_bounds() {
        let settings = PaginationSettings {
            default_limit: 25,
            max_limit: 200,
        };
        let mut spec = PageSpec::new(2, 150);
        spec.normalize_with(&settings);
        assert_eq!(spec.limit, 150);
        assert_eq!(spec.offset(), 150);

        let mut spec = PageSpec::new(2, 500);
        spec.normalize_with(&settings);
        assert_eq!(spec.limit, 25);
    }

    #[test]
    fn test_normalize_with_nonsense_bounds() {
        let settings = PaginationSettings {
            default_limit: 0,
            max_limit: -3,
        };
        let mut spec = PageSpec::new(1, 0);
        spec.normalize_with(&settings);
        assert_eq!(spec.limit, 10);
    }

    #[test]
    fn test_deserialize_aliases() {
        let spec: PageSpec = serde_json::from_str(
            r#"{"page": 2, "page_size": 30, "key": "go", "order": "title asc"}"#,
        )
        .unwrap();
        assert_eq!(spec.page, 2);
        assert_eq!(spec.limit, 30);
        assert_eq!(spec.search_key, "go");
        assert_eq!(spec.order_expr, "title asc");
        assert!(spec.has_search());
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let spec: PageSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.limit(), 10);
        assert!(!spec.has_search());
    }

    #[test]
    fn test_builders() {
        let spec = PageSpec::new(1, 5).with_search("go").with_order("-id");
        assert_eq!(spec.search_key, "go");
        assert_eq!(spec.order_expr, "-id");
    }
}
