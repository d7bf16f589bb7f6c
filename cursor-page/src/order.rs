//! Order specifications: which column a page walks, and in which direction.

use std::fmt;

use crate::validate::{assert_valid_sql_identifier, is_valid_sql_identifier};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDir {
    /// Ascending (no marker).
    #[default]
    Asc,
    /// Descending (`-` marker).
    Desc,
}

impl SortDir {
    /// `true` for [`SortDir::Desc`].
    #[inline]
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Desc)
    }

    /// SQL keyword for this direction.
    #[inline]
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Errors produced while parsing or validating an order specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OrderError {
    /// No column was given.
    #[error("order_by is empty")]
    Empty,
    /// The column is not a valid SQL identifier.
    #[error("invalid order_by column '{0}'")]
    InvalidColumn(String),
    /// The column is valid but not sortable for this endpoint.
    #[error("order_by column '{column}' not allowed. Allowed: {allowed:?}")]
    NotAllowed {
        /// Requested column.
        column: String,
        /// Columns the endpoint accepts.
        allowed: Vec<String>,
    },
}

/// A column plus direction, with an optional identity tie-breaker.
///
/// Written as the column name, prefixed with `-` for descending:
/// `"rating"` sorts ascending, `"-id"` sorts descending.
///
/// A single non-unique column does not give a stable order across pages, so
/// an identity column can be attached with [`OrderBy::with_identity`]. Rows
/// are then ordered by `(column, identity)`, both in the same direction.
///
/// ```
/// use cursor_page::{OrderBy, SortDir};
///
/// let order = OrderBy::parse("-rating").unwrap().with_identity("id").unwrap();
/// assert_eq!(order.column(), "rating");
/// assert_eq!(order.dir(), SortDir::Desc);
///
/// let keys: Vec<_> = order.keys().collect();
/// assert_eq!(keys, [("rating", SortDir::Desc), ("id", SortDir::Desc)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    column: String,
    dir: SortDir,
    identity: Option<String>,
}

impl OrderBy {
    /// Create an order specification from code.
    ///
    /// # Panics
    ///
    /// Panics if the column is not a valid SQL identifier.
    pub fn new(column: impl Into<String>, dir: SortDir) -> Self {
        let column = column.into();
        assert_valid_sql_identifier(&column, "order_by column");
        Self {
            column,
            dir,
            identity: None,
        }
    }

    /// Ascending on `column`. Panics like [`OrderBy::new`].
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDir::Asc)
    }

    /// Descending on `column`. Panics like [`OrderBy::new`].
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDir::Desc)
    }

    /// Parse `"column"` or `"-column"`.
    pub fn parse(raw: &str) -> Result<Self, OrderError> {
        let raw = raw.trim();
        let (column, dir) = match raw.strip_prefix('-') {
            Some(stripped) => (stripped, SortDir::Desc),
            None => (raw, SortDir::Asc),
        };
        if column.is_empty() {
            return Err(OrderError::Empty);
        }
        if !is_valid_sql_identifier(column) {
            return Err(OrderError::InvalidColumn(column.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            dir,
            identity: None,
        })
    }

    /// Attach the unique identity column used to break ties.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Result<Self, OrderError> {
        let identity = identity.into();
        if !is_valid_sql_identifier(&identity) {
            return Err(OrderError::InvalidColumn(identity));
        }
        self.identity = Some(identity);
        Ok(self)
    }

    /// Reject the order unless its column is in `allowed`.
    pub fn ensure_allowed(&self, allowed: &[&str]) -> Result<(), OrderError> {
        if allowed.contains(&self.column.as_str()) {
            return Ok(());
        }
        Err(OrderError::NotAllowed {
            column: self.column.clone(),
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Primary sort column.
    #[inline]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Requested direction.
    #[inline]
    pub const fn dir(&self) -> SortDir {
        self.dir
    }

    /// Identity tie-breaker, if any.
    #[inline]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// The sort keys to apply, in priority order.
    ///
    /// The identity column is only added when it differs from the primary
    /// column.
    pub fn keys(&self) -> impl Iterator<Item = (&str, SortDir)> {
        self.keys_with(None)
    }

    /// Like [`OrderBy::keys`], with `fallback` as the tie-breaker when no
    /// identity is attached.
    pub fn keys_with<'a>(
        &'a self,
        fallback: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a str, SortDir)> + 'a {
        let tiebreak = self
            .identity
            .as_deref()
            .or(fallback)
            .filter(|identity| *identity != self.column)
            .map(|identity| (identity, self.dir));
        std::iter::once((self.column.as_str(), self.dir)).chain(tiebreak)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dir.is_descending() {
            f.write_str("-")?;
        }
        f.write_str(&self.column)
    }
}
