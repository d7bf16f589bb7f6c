//! [`QuerySource`] backed by a `rusqlite` connection.
//!
//! Queries are rendered with [`SelectQuery<Sqlite>`](crate::SelectQuery) and
//! run synchronously on the shared connection when the page future is
//! polled.

use std::future::Future;
use std::sync::{Arc, Mutex};

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::order::SortDir;
use crate::query::{QuerySource, WindowQuery};
use crate::sql::{Filter, Operator, QueryResult, SelectQuery, Sqlite};
use crate::validate::assert_valid_sql_identifier;
use crate::value::{Row, Value};

/// Errors from the SQLite collaborator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SqliteError {
    /// SQLite rejected or failed the statement.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// Another thread panicked while holding the connection.
    #[error("sqlite connection mutex poisoned")]
    Poisoned,
    /// A column held a type `Row` cannot represent.
    #[error("column '{column}' has unsupported type {kind}")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// SQLite storage class.
        kind: &'static str,
    },
}

/// A table in a SQLite database.
///
/// Ties in the requested order are broken on `id` unless another column is
/// set with [`SqliteSource::identity`].
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use cursor_page::SqliteSource;
///
/// let conn = rusqlite::Connection::open_in_memory().unwrap();
/// let movies = SqliteSource::new(Arc::new(Mutex::new(conn)), "movie")
///     .fields(&["id", "name", "rating"]);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
    table: String,
    fields: Vec<String>,
    filters: Vec<Filter>,
    identity: Option<String>,
}

impl SqliteSource {
    /// Create a source over `table`.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(conn: Arc<Mutex<Connection>>, table: &str) -> Self {
        assert_valid_sql_identifier(table, "table");
        Self {
            conn,
            table: table.to_string(),
            fields: Vec::new(),
            filters: Vec::new(),
            identity: Some("id".to_string()),
        }
    }

    /// Set the tie-breaking identity column. `None` disables it, for tables
    /// whose requested orders are always unique.
    ///
    /// # Panics
    ///
    /// Panics if the column is not a valid SQL identifier.
    pub fn identity(mut self, column: Option<&str>) -> Self {
        if let Some(column) = column {
            assert_valid_sql_identifier(column, "identity column");
        }
        self.identity = column.map(str::to_string);
        self
    }

    /// Restrict the selected columns. Empty selects `*`.
    ///
    /// # Panics
    ///
    /// Panics if any field name is not a valid SQL identifier.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            assert_valid_sql_identifier(field, "field");
        }
        self.fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Only page over rows matching this condition.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn filter(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, op, value));
        self
    }
}

impl QuerySource for SqliteSource {
    type Record = Row;
    type Error = SqliteError;
    type Query = SqliteQuery;

    fn query(&self) -> SqliteQuery {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        SqliteQuery {
            conn: Arc::clone(&self.conn),
            select: SelectQuery::new(Sqlite, &self.table)
                .fields(&fields)
                .filters(&self.filters),
        }
    }

    fn identity_column(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// A pending query against a [`SqliteSource`].
#[derive(Debug, Clone)]
pub struct SqliteQuery {
    conn: Arc<Mutex<Connection>>,
    select: SelectQuery<Sqlite>,
}

impl SqliteQuery {
    /// The SQL this query would run.
    pub fn to_sql(&self) -> QueryResult {
        self.select.build()
    }
}

impl WindowQuery for SqliteQuery {
    type Record = Row;
    type Error = SqliteError;

    fn order_by(mut self, column: &str, descending: bool) -> Self {
        let dir = if descending { SortDir::Desc } else { SortDir::Asc };
        self.select = self.select.sort(column, dir);
        self
    }

    fn skip(mut self, n: u64) -> Self {
        self.select = self.select.offset(n);
        self
    }

    fn limit(mut self, n: u64) -> Self {
        self.select = self.select.limit(n);
        self
    }

    fn execute(self) -> impl Future<Output = Result<Vec<Row>, SqliteError>> + Send {
        let query = self.select.build();
        async move {
            tracing::debug!(sql = %query.sql, params = query.params.len(), "executing window query");
            run(&self.conn, &query)
        }
    }
}

fn run(conn: &Mutex<Connection>, query: &QueryResult) -> Result<Vec<Row>, SqliteError> {
    let conn = conn.lock().map_err(|_| SqliteError::Poisoned)?;
    let mut stmt = conn.prepare(&query.sql)?;
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (idx, name) in names.iter().enumerate() {
            record.push(name.as_str(), from_sql(name, row.get_ref(idx)?)?);
        }
        out.push(record);
    }
    Ok(out)
}

fn from_sql(column: &str, value: ValueRef<'_>) -> Result<Value, SqliteError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => {
            return Err(SqliteError::UnsupportedType {
                column: column.to_string(),
                kind: "BLOB",
            });
        },
    })
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Self::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Self::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Self::String(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(conn: Connection) -> Arc<Mutex<Connection>> {
        Arc::new(Mutex::new(conn))
    }

    fn seeded() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE movie (id INTEGER PRIMARY KEY, name TEXT NOT NULL, rating INTEGER, score REAL, poster BLOB);
             INSERT INTO movie (name, rating, score) VALUES ('Star Wars', 93, 9.3);
             INSERT INTO movie (name, rating, score) VALUES ('Lord of the Rings', 90, NULL);
             INSERT INTO movie (name, rating, score) VALUES ('Dune', 83, 8.3);",
        )
        .unwrap();
        shared(conn)
    }

    #[test]
    fn test_query_renders_window() {
        let source = SqliteSource::new(seeded(), "movie")
            .fields(&["id", "name"])
            .filter("rating", Operator::Gte, 85);
        let query = source.query().order_by("id", true).skip(1).limit(1);
        let result = query.to_sql();
        assert_eq!(
            result.sql,
            "SELECT id, name FROM movie WHERE rating >= ?1 ORDER BY id DESC LIMIT 1 OFFSET 1"
        );
        assert_eq!(result.params, [Value::Int(85)]);
    }

    #[test]
    fn test_identity_column_defaults_to_id() {
        let source = SqliteSource::new(seeded(), "movie");
        assert_eq!(source.identity_column(), Some("id"));
        assert_eq!(source.clone().identity(Some("rowid")).identity_column(), Some("rowid"));
        assert_eq!(source.identity(None).identity_column(), None);
    }

    #[test]
    fn test_execute_is_lazy() {
        let conn = seeded();
        let source = SqliteSource::new(Arc::clone(&conn), "movie");
        let guard = conn.lock().unwrap();
        // building the future must not touch the locked connection
        let pending = source.query().order_by("id", false).execute();
        drop(guard);

        let rows = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(pending)
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_execute_maps_types() {
        let source = SqliteSource::new(seeded(), "movie").fields(&["id", "name", "score"]);
        let rows = source.query().order_by("id", false).execute().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            Row::new()
                .with("id", 1)
                .with("name", "Star Wars")
                .with("score", 9.3)
        );
        assert_eq!(rows[1].get("score"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_execute_binds_filters() {
        let source = SqliteSource::new(seeded(), "movie")
            .fields(&["name"])
            .filter("name", Operator::Ne, "Dune")
            .filter("score", Operator::Eq, Value::Null);
        let rows = source.query().execute().await.unwrap();
        assert_eq!(rows, [Row::new().with("name", "Lord of the Rings")]);
    }

    #[tokio::test]
    async fn test_blob_column_is_rejected() {
        let conn = seeded();
        conn.lock()
            .unwrap()
            .execute("UPDATE movie SET poster = x'00ff' WHERE id = 1", [])
            .unwrap();
        let source = SqliteSource::new(conn, "movie").fields(&["id", "poster"]);
        let err = source.query().order_by("id", false).execute().await.unwrap_err();
        assert!(matches!(
            err,
            SqliteError::UnsupportedType { ref column, kind: "BLOB" } if column == "poster"
        ));
    }

    #[tokio::test]
    async fn test_missing_table_is_sqlite_error() {
        let source = SqliteSource::new(shared(Connection::open_in_memory().unwrap()), "movie");
        let err = source.query().execute().await.unwrap_err();
        assert!(matches!(err, SqliteError::Sqlite(_)));
    }
}
