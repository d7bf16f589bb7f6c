//! In-memory collection.
//!
//! Sorts a snapshot of its rows on every query, so it is meant for tests,
//! fixtures and small lookup tables rather than large data sets.

use std::convert::Infallible;
use std::future::{Future, ready};
use std::sync::Arc;

use crate::query::{QuerySource, WindowQuery};
use crate::validate::assert_valid_sql_identifier;
use crate::value::{Row, Value};

/// A [`QuerySource`] over rows held in memory.
///
/// Columns missing from a row sort as `NULL`. Ties are broken on `id` unless
/// another identity column is set with [`MemoryCollection::identity`].
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    rows: Arc<Vec<Row>>,
    identity: Option<String>,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryCollection {
    /// Create a collection from rows, in insertion order.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Arc::new(rows),
            identity: Some("id".to_string()),
        }
    }

    /// Set the tie-breaking identity column. `None` disables it.
    ///
    /// # Panics
    ///
    /// Panics if the column is not a valid SQL identifier.
    #[must_use]
    pub fn identity(mut self, column: Option<&str>) -> Self {
        if let Some(column) = column {
            assert_valid_sql_identifier(column, "identity column");
        }
        self.identity = column.map(str::to_string);
        self
    }

    /// Append a row. Queries already started keep their snapshot.
    pub fn insert(&mut self, row: Row) {
        Arc::make_mut(&mut self.rows).push(row);
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Row> for MemoryCollection {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl QuerySource for MemoryCollection {
    type Record = Row;
    type Error = Infallible;
    type Query = MemoryQuery;

    fn query(&self) -> MemoryQuery {
        MemoryQuery {
            rows: Arc::clone(&self.rows),
            sorts: Vec::new(),
            skip: 0,
            limit: None,
        }
    }

    fn identity_column(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// Query over a [`MemoryCollection`] snapshot.
#[derive(Debug, Clone)]
pub struct MemoryQuery {
    rows: Arc<Vec<Row>>,
    sorts: Vec<(String, bool)>,
    skip: u64,
    limit: Option<u64>,
}

impl MemoryQuery {
    fn run(&self) -> Vec<Row> {
        let mut ordered: Vec<&Row> = self.rows.iter().collect();
        // Stable: rows equal on every key keep insertion order
        ordered.sort_by(|a, b| {
            self.sorts
                .iter()
                .map(|(column, descending)| {
                    let ord = column_value(a, column).sort_cmp(column_value(b, column));
                    if *descending { ord.reverse() } else { ord }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        ordered.into_iter().skip(skip).take(take).cloned().collect()
    }
}

fn column_value<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

impl WindowQuery for MemoryQuery {
    type Record = Row;
    type Error = Infallible;

    fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.sorts.push((column.to_string(), descending));
        self
    }

    fn skip(mut self, n: u64) -> Self {
        self.skip = n;
        self
    }

    fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    fn execute(self) -> impl Future<Output = Result<Vec<Row>, Infallible>> + Send {
        ready(Ok(self.run()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .filter_map(|row| row.get("id").and_then(Value::as_int))
            .collect()
    }

    fn fixture() -> MemoryCollection {
        [(1, "b"), (2, "a"), (3, "b"), (4, "c")]
            .into_iter()
            .map(|(id, tag)| Row::new().with("id", id).with("tag", tag))
            .collect()
    }

    #[tokio::test]
    async fn test_order_skip_limit() {
        let rows = fixture()
            .query()
            .order_by("id", true)
            .skip(1)
            .limit(2)
            .execute()
            .await
            .unwrap();
        assert_eq!(ids(&rows), [3, 2]);
    }

    #[tokio::test]
    async fn test_secondary_key_breaks_ties() {
        let rows = fixture()
            .query()
            .order_by("tag", false)
            .order_by("id", true)
            .execute()
            .await
            .unwrap();
        assert_eq!(ids(&rows), [2, 3, 1, 4]);
    }

    #[test]
    fn test_identity_column() {
        assert_eq!(fixture().identity_column(), Some("id"));
        assert_eq!(MemoryCollection::default().identity_column(), Some("id"));
        assert_eq!(fixture().identity(Some("tag")).identity_column(), Some("tag"));
        assert_eq!(fixture().identity(None).identity_column(), None);
    }

    #[test]
    #[should_panic(expected = "Invalid SQL identity column name")]
    fn test_invalid_identity_panics() {
        let _ = fixture().identity(Some("id desc"));
    }

    #[tokio::test]
    async fn test_skip_past_end_is_empty() {
        let rows = fixture().query().skip(10).limit(5).execute().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_query_keeps_snapshot() {
        let mut collection = fixture();
        let query = collection.query().order_by("id", false);
        collection.insert(Row::new().with("id", 0));

        let rows = query.execute().await.unwrap();
        assert_eq!(ids(&rows), [1, 2, 3, 4]);
        assert_eq!(collection.len(), 5);
    }
}
