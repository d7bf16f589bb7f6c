//! SELECT rendering for windowed queries.

use crate::order::SortDir;
use crate::validate::assert_valid_sql_identifier;
use crate::value::Value;

use super::dialect::Dialect;

/// SQL comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal: `=` (`IS NULL` against `NULL`)
    Eq,
    /// Not equal: `!=` (`IS NOT NULL` against `NULL`)
    Ne,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Gte,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Lte,
}

impl Operator {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column to compare.
    pub field: String,
    /// Comparison.
    pub op: Operator,
    /// Right-hand side, bound as a parameter.
    pub value: Value,
}

impl Filter {
    /// Create a filter.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "filter field");
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Render this condition, returning the SQL, its parameters and the next
    /// free parameter index.
    fn build<D: Dialect>(&self, dialect: &D, idx: usize) -> (String, Option<Value>, usize) {
        let field = &self.field;
        match (self.op, &self.value) {
            (Operator::Eq, Value::Null) => (format!("{field} IS NULL"), None, idx),
            (Operator::Ne, Value::Null) => (format!("{field} IS NOT NULL"), None, idx),
            (op, value) => (
                format!("{} {} {}", field, op.as_sql(), dialect.param(idx)),
                Some(value.clone()),
                idx + 1,
            ),
        }
    }
}

/// Query result with SQL string and parameters.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// Rendered SQL.
    pub sql: String,
    /// Positional parameters, in placeholder order.
    pub params: Vec<Value>,
}

/// SELECT builder with dialect support.
///
/// ```
/// use cursor_page::{Operator, SortDir, sqlite};
///
/// let result = sqlite("movie")
///     .fields(&["id", "name"])
///     .filter("rating", Operator::Gte, 80)
///     .sort("rating", SortDir::Desc)
///     .sort("id", SortDir::Desc)
///     .limit(10)
///     .offset(20)
///     .build();
///
/// assert_eq!(
///     result.sql,
///     "SELECT id, name FROM movie WHERE rating >= ?1 ORDER BY rating DESC, id DESC LIMIT 10 OFFSET 20"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery<D: Dialect> {
    dialect: D,
    table: String,
    fields: Vec<String>,
    filters: Vec<Filter>,
    sorts: Vec<(String, SortDir)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<D: Dialect> SelectQuery<D> {
    /// Create a new query for the given table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            dialect,
            table,
            fields: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Set the fields to SELECT. Empty selects `*`.
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

    /// Add a filter condition. Conditions are joined with `AND`.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn filter(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::new(field, op, value));
        self
    }

    /// Add prepared filters.
    pub fn filters(mut self, filters: &[Filter]) -> Self {
        self.filters.extend(filters.iter().cloned());
        self
    }

    /// Add a sort field. Earlier sorts take priority.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn sort(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "sort field");
        self.sorts.push((field, dir));
        self
    }

    /// Set a row limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set a row offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build the SQL query and parameters.
    pub fn build(&self) -> QueryResult {
        let select = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };
        let mut sql = format!("SELECT {select} FROM {}", self.table);
        let mut params = Vec::new();

        if !self.filters.is_empty() {
            let mut idx = 1usize;
            let mut conditions = Vec::with_capacity(self.filters.len());
            for filter in &self.filters {
                let (condition, param, next_idx) = filter.build(&self.dialect, idx);
                conditions.push(condition);
                params.extend(param);
                idx = next_idx;
            }
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.sorts.is_empty() {
            let sort_parts: Vec<String> = self
                .sorts
                .iter()
                .map(|(field, dir)| format!("{field} {}", dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&sort_parts.join(", "));
        }

        sql.push_str(&self.dialect.window_clause(self.limit, self.offset));

        QueryResult { sql, params }
    }
}
