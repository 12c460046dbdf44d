//! Pagination and status filtering for the read path.
//!
//! Pure computation over `(page, limit, total_count)`. The store applies the
//! resulting `PageWindow` as given; clamping happens here, before it.

use serde::{Deserialize, Serialize};

use super::errors::TaskdError;
use super::state::TaskStatus;
use super::task::Task;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw listing parameters as parsed by the request-encoding layer.
///
/// `None` and non-positive values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

/// Normalized page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Apply defaults and clamp `limit` to `MAX_LIMIT` (truncating, not rejecting).
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p > 0 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l > 0 => l.min(i64::from(MAX_LIMIT)) as u32,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// `skip = (page - 1) * limit`
    pub fn window(&self) -> PageWindow {
        PageWindow {
            skip: u64::from(self.page - 1) * u64::from(self.limit),
            limit: u64::from(self.limit),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// What the store actually applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

/// `ceil(total_count / limit)` with integer arithmetic.
///
/// `limit == 0` is treated as "no pages" rather than dividing by zero.
pub fn total_pages(total_count: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    let pages = total_count / limit;
    if total_count % limit > 0 {
        pages + 1
    } else {
        pages
    }
}

/// Parse an optional status filter; unknown values are a validation error.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<TaskStatus>, TaskdError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| {
            TaskdError::Invalid(
                "invalid status filter, must be one of: pending, in_progress, completed"
                    .to_string(),
            )
        }),
    }
}

/// One page of listing results, ready for response serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl TaskPage {
    pub fn new(tasks: Vec<Task>, request: PageRequest, total_count: u64) -> Self {
        Self {
            tasks,
            page: request.page(),
            limit: request.limit(),
            total_count,
            total_pages: total_pages(total_count, u64::from(request.limit())),
        }
    }
}
