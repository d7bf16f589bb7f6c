//! The query collaborator the engine drives.
//!
//! The engine never talks to a database directly. It asks a [`QuerySource`]
//! for a fresh [`WindowQuery`], applies ordering and a skip/limit window, and
//! awaits a single [`WindowQuery::execute`].

use std::future::Future;

/// A named, ordered collection that can be queried.
pub trait QuerySource {
    /// Record type produced by a query.
    type Record;
    /// Error produced by a failed query. Propagated unchanged.
    type Error;
    /// Query builder for this collection.
    type Query: WindowQuery<Record = Self::Record, Error = Self::Error>;

    /// Start a query over the whole collection.
    fn query(&self) -> Self::Query;

    /// Unique column ordered on after the requested column, so rows that tie
    /// keep one order across pages. Used when the request's
    /// [`OrderBy`](crate::OrderBy) carries no identity of its own.
    fn identity_column(&self) -> Option<&str>;
}

/// A query under construction.
///
/// `order_by` may be called several times; earlier calls take priority.
pub trait WindowQuery: Sized {
    /// Record type produced by [`WindowQuery::execute`].
    type Record;
    /// Error produced by [`WindowQuery::execute`].
    type Error;

    /// Order by `column`, descending when `descending` is set.
    fn order_by(self, column: &str, descending: bool) -> Self;

    /// Skip the first `n` rows of the ordered collection.
    fn skip(self, n: u64) -> Self;

    /// Return at most `n` rows.
    fn limit(self, n: u64) -> Self;

    /// Run the query.
    fn execute(self) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send;
}
