//! Pagination.

/// A page request: a 1-based page number and a page size.
///
/// A size of [`Page::ALL`] (`-1`) is the sentinel for "no pagination, return everything", which
/// is also the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Page {
    pub number: u64,
    pub size: i64,
}

impl Page {
    /// The size sentinel meaning "no pagination".
    pub const ALL: i64 = -1;

    pub fn new(number: u64, size: i64) -> Self {
        Self { number, size }
    }

    /// The number of items on a page, or [`None`] when pagination is disabled.
    pub fn limit(&self) -> Option<u64> {
        (self.size >= 0).then_some(self.size as u64)
    }

    /// The number of items to skip before this page starts.
    pub fn offset(&self) -> u64 {
        match self.limit() {
            Some(limit) => self.number.saturating_sub(1) * limit,
            None => 0,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: Self::ALL,
        }
    }
}

/// Pagination metadata for a collection under a page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    /// The requested page number.
    pub number: u64,
    /// The requested page size.
    pub size: i64,
    /// The total number of resources in the (filtered) collection.
    pub resources: usize,
    /// The total number of pages at this size.
    pub total: usize,
}

impl PageInfo {
    /// Page metadata for a collection of `resources` items under `page`.
    pub fn new(page: Page, resources: usize) -> Self {
        let total = match page.limit() {
            Some(0) | None => usize::from(resources > 0),
            Some(limit) => resources.div_ceil(limit as usize),
        };
        Self {
            number: page.number,
            size: page.size,
            resources,
            total,
        }
    }
}
