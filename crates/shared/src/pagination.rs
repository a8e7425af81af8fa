//! Page-based pagination utilities.
//!
//! Request collections are small, so listing endpoints fetch the full set,
//! filter and sort it in memory, then cut a page out of the result.

use serde::Serialize;
use thiserror::Error;

/// Default number of items per page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Upper bound for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// Error type for page parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Page must be at least 1")]
    InvalidPage,
    #[error("Per page must be between 1 and {MAX_PER_PAGE}")]
    InvalidPerPage,
}

/// Validated page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Builds page parameters from optional query values.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Result<Self, PageError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);

        if page == 0 {
            return Err(PageError::InvalidPage);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PageError::InvalidPerPage);
        }
        Ok(Self { page, per_page })
    }

    /// Number of items to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: u32,
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: usize, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as usize) as u32
}

/// Cuts the requested page out of an already filtered and sorted collection.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let data = items
        .into_iter()
        .skip(request.offset())
        .take(request.per_page as usize)
        .collect();

    Page {
        data,
        pagination: PageInfo {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total_pages(total, request.per_page),
        },
    }
}
