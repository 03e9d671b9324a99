//! Generic collection querying over pluggable backends.
//!
//! A validated query — filters, sorters, and a page — can run against very different sources: a
//! plain in-memory sequence of records, or an external queryable the host resolves through its
//! own ORM. The [`Delegate`] trait is the narrow capability protocol a backend implements so
//! that the free functions here ([`query`], [`all`], [`page_info`]) behave identically over
//! either. Two reference backends ship with the crate: [`memory::Records`] and
//! [`sql::SelectQuery`].
//!
//! Everything is synchronous; a backend that ultimately performs I/O does so behind its own
//! `all` as one opaque call.

pub mod memory;
pub mod sql;

use crate::query::{Filter, Page, PageInfo, Sorter};

/// The capability protocol a query backend implements.
///
/// `filter`, `sort`, and `paginate` each refine the source and return it; `all` finishes the
/// query and yields whatever "the results" means for the backend — records for an in-memory
/// source, a rendered statement for a SQL builder.
pub trait Delegate: Sized {
    /// The result of finishing a query against this backend.
    type Output;

    /// Restrict the source to items matching every filter.
    fn filter(self, filters: &[Filter]) -> Self;

    /// Order the source by the given sort keys, cascading left to right.
    fn sort(self, sorters: &[Sorter]) -> Self;

    /// Restrict the source to one page.
    fn paginate(self, page: Page) -> Self;

    /// Finish the query.
    fn all(self) -> Self::Output;
}

/// A backend that can count its contents without finishing the query.
///
/// The SQL builder cannot (counting means executing), which is why this is split out of
/// [`Delegate`]; [`page_info`] is only available over countable sources.
pub trait Countable: Delegate {
    /// The number of items currently in the source.
    fn total(&self) -> usize;

    /// Is the source non-empty?
    fn any(&self) -> bool {
        self.total() > 0
    }
}

/// A validated query: the canonical output of parameter validation, ready for dispatch.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sorters: Vec<Sorter>,
    pub page: Page,
}

/// Apply a query's filters and sorters to a source, without pagination.
pub fn query<D: Delegate>(source: D, query: &Query) -> D {
    source.filter(&query.filters).sort(&query.sorters)
}

/// Apply a whole query — filter, sort, paginate — and finish it.
pub fn all<D: Delegate>(source: D, q: &Query) -> D::Output {
    query(source, q).paginate(q.page).all()
}

/// The number of items in a source.
pub fn total<D: Countable>(source: &D) -> usize {
    source.total()
}

/// Is the source non-empty?
pub fn any<D: Countable>(source: &D) -> bool {
    source.any()
}

/// Pagination metadata for an already-filtered source under a query's page request.
pub fn page_info<D: Countable>(source: &D, query: &Query) -> PageInfo {
    PageInfo::new(query.page, source.total())
}
