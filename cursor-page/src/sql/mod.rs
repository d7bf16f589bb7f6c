//! SQL rendering of windowed queries.

mod dialect;
mod select;

pub use dialect::{Dialect, Postgres, Sqlite};
pub use select::{Filter, Operator, QueryResult, SelectQuery};

/// Build a query for Postgres.
///
/// Convenience function that creates a `SelectQuery` with Postgres dialect.
#[must_use]
pub fn postgres(table: &str) -> SelectQuery<Postgres> {
    SelectQuery::new(Postgres, table)
}

/// Build a query for `SQLite`.
///
/// Convenience function that creates a `SelectQuery` with `SQLite` dialect.
#[must_use]
pub fn sqlite(table: &str) -> SelectQuery<Sqlite> {
    SelectQuery::new(Sqlite, table)
}
