//! Offset-based pagination.
//!
//! Clients send a 1-based `page` and a page size (`limit`). The resolved [`PageWindow`] selects the rows
//! `[offset, offset + limit)` of a listing with a total order.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Page numbers start at 1, but page {0} was requested")]
    InvalidPage(u32),
    #[error("Page size must be between 1 and {MAX_PAGE_SIZE}, but {0} was requested")]
    InvalidLimit(u32),
}

/// A page request, as it arrives in a query string. Missing values fall back to the first page and the listing's
/// default page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: Some(page), limit: Some(limit) }
    }

    pub fn resolve(&self, default_limit: u32) -> Result<PageWindow, PaginationError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit);
        if page == 0 {
            return Err(PaginationError::InvalidPage(page));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidLimit(limit));
        }
        let offset = u64::from(page - 1) * u64::from(limit);
        Ok(PageWindow { page, limit, offset })
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
}

impl PageWindow {
    /// `LIMIT` and `OFFSET` values ready to be bound into a query.
    pub fn sql_bounds(&self) -> (i64, i64) {
        #[allow(clippy::cast_possible_wrap)]
        (i64::from(self.limit), self.offset.min(i64::MAX as u64) as i64)
    }

    pub fn with_total<T>(self, data: Vec<T>, total: i64) -> Paginated<T> {
        let total = total.max(0);
        let limit = i64::from(self.limit);
        let total_pages = (total + limit - 1) / limit;
        Paginated { data, pagination: PageInfo { page: self.page, limit: self.limit, total, total_pages } }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated { data: self.data.into_iter().map(f).collect(), pagination: self.pagination }
    }
}
