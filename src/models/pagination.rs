//! List windows for the task listing.
//!
//! Two query shapes are accepted: `page`/`per_page`, or the half-open
//! `_start`/`_end` row range sent by admin-style frontends. A range wins when
//! both bounds are present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(rename = "_start")]
    pub start: Option<i64>,
    #[serde(rename = "_end")]
    pub end: Option<i64>,
}

impl Pagination {
    const MAX_PER_PAGE: i64 = 100;
    const DEFAULT_PER_PAGE: i64 = 25;

    pub fn pages(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    fn row_range(&self) -> Option<(i64, i64)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start.max(0), end)),
            _ => None,
        }
    }

    /// Rows to return, always in `1..=100`.
    pub fn limit(&self) -> i64 {
        let wanted = match self.row_range() {
            Some((start, end)) => end.saturating_sub(start),
            None => self.per_page.unwrap_or(Self::DEFAULT_PER_PAGE),
        };
        wanted.clamp(1, Self::MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        match self.row_range() {
            Some((start, _)) => start,
            None => (self.current_page() - 1).saturating_mul(self.limit()),
        }
    }

    /// 1-based page the window starts on.
    pub fn current_page(&self) -> i64 {
        match self.row_range() {
            Some((start, _)) => (start / self.limit()).saturating_add(1),
            None => self.page.unwrap_or(1).max(1),
        }
    }
}

/// One window of a filtered list plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        let per_page = pagination.limit();
        Self {
            items,
            total,
            page: pagination.current_page(),
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}
