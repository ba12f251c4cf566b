//! Page slicing with count metadata.

use serde::{Deserialize, Serialize};

use crate::types::{FilterRequest, coerce_int, present};

/// Page size when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A resolved page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build from explicit numbers, clamping page to at least 1 and falling
    /// back to `default_per` for a non-positive page size.
    pub fn new(page: i64, per_page: i64, default_per: usize, max_per: Option<usize>) -> Self {
        let page = usize::try_from(page).unwrap_or(0).max(1);
        let mut per_page = match usize::try_from(per_page) {
            Ok(n) if n > 0 => n,
            _ => default_per.max(1),
        };
        if let Some(max) = max_per {
            per_page = per_page.min(max.max(1));
        }
        Self { page, per_page }
    }

    pub fn from_request(request: &FilterRequest, default_per: usize, max_per: Option<usize>) -> Self {
        let page = present(&request.page).map(coerce_int).unwrap_or(1);
        let per = present(&request.per).map(coerce_int).unwrap_or(0);
        Self::new(page, per, default_per, max_per)
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: usize) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_count,
            total_pages: total_count.div_ceil(request.per_page),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Slice an in-memory sequence. Out-of-range pages come back empty.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_count = items.len();
    let contents: Vec<T> = items
        .into_iter()
        .skip(request.offset())
        .take(request.per_page)
        .collect();
    Page::new(contents, request, total_count)
}
