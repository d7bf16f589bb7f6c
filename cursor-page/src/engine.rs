//! The pagination engine.
//!
//! Turns a [`PageRequest`] into one windowed query and derives the cursor of
//! the following page. All state lives in the cursor; the engine keeps
//! nothing between calls.
//!
//! # Windowing
//!
//! For a decoded offset `o` and page size `n`:
//!
//! | Mode     | Rows fetched (forward positions) | Next cursor                                   |
//! |----------|----------------------------------|-----------------------------------------------|
//! | forward  | `[o, o + n)`                     | `o + n` if `n` rows came back, else `""`      |
//! | backward | `[o - min(n, o), o)`             | `o - min(n, o)`, or `""` when that is `0`     |
//! | backward, `o == 0` | nothing, no query issued | `""`                                      |
//!
//! Offsets stop at [`MAX_OFFSET`]; a forward window is cut short there.
//!
//! Both windows are read in the requested order, so `rows` always follow
//! `order_by` and a backward page never needs reordering. Reading the
//! backward window in reverse order would require the collection size,
//! i.e. a second query.

use serde::Serialize;

use crate::cursor::{self, END_CURSOR, MAX_OFFSET};
use crate::error::PaginationError;
use crate::order::OrderBy;
use crate::query::{QuerySource, WindowQuery};

/// Response header carrying the next cursor.
pub const NEXT_CURSOR_HEADER: &str = "next_cursor";

/// One page request.
///
/// ```
/// use cursor_page::{OrderBy, PageRequest};
///
/// let request = PageRequest::new(OrderBy::desc("id"))
///     .cursor("MQ==")
///     .previous(true)
///     .page_size(1);
/// assert_eq!(request.page_size, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Raw client cursor token. Empty means start of the sequence.
    pub cursor: String,
    /// Walk backward from the cursor instead of forward.
    pub previous: bool,
    /// Rows per page. Must be positive.
    pub page_size: u64,
    /// Order the pages walk.
    pub order_by: OrderBy,
}

impl PageRequest {
    /// Default page size of a request built with [`PageRequest::new`].
    pub const DEFAULT_PAGE_SIZE: u64 = 20;

    /// A forward request from the start of the sequence.
    pub fn new(order_by: OrderBy) -> Self {
        Self {
            cursor: String::new(),
            previous: false,
            page_size: Self::DEFAULT_PAGE_SIZE,
            order_by,
        }
    }

    /// Set the cursor token.
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Set the direction.
    #[must_use]
    pub fn previous(mut self, previous: bool) -> Self {
        self.previous = previous;
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<R> {
    /// Rows, ordered as `order_by` requests.
    pub rows: Vec<R>,
    /// Cursor of the next page in the same direction, or `""` if none.
    pub next_cursor: String,
}

impl<R> PageResult<R> {
    /// An empty page with no further page.
    #[must_use]
    pub const fn end() -> Self {
        Self {
            rows: Vec::new(),
            next_cursor: String::new(),
        }
    }

    /// Whether another page exists in the same direction.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next_cursor != END_CURSOR
    }

    /// The `(name, value)` header pair for the next cursor.
    pub fn header(&self) -> (&'static str, &str) {
        (NEXT_CURSOR_HEADER, &self.next_cursor)
    }

    /// Convert every row, keeping the cursor.
    pub fn map<T>(self, f: impl FnMut(R) -> T) -> PageResult<T> {
        PageResult {
            rows: self.rows.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// What a request needs from the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to fetch: backward from the start, or forward from the last
    /// addressable position.
    Empty,
    /// Fetch one window.
    Fetch(Window),
}

/// A skip/limit window over the ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Decoded cursor offset.
    pub offset: u64,
    /// Rows to skip, in the requested order.
    pub skip: u64,
    /// Rows to return.
    pub limit: u64,
    /// Whether this window walks backward.
    pub previous: bool,
}

impl Window {
    /// Cursor for the page after this one, given how many rows came back.
    #[must_use]
    pub fn next_cursor(&self, fetched: usize) -> String {
        if self.previous {
            // skip is the window start; nothing lies before position 0
            if self.skip == 0 {
                return END_CURSOR.to_string();
            }
            return cursor::encode(self.skip);
        }
        let full = u64::try_from(fetched).map_or(true, |n| n >= self.limit);
        if !full {
            return END_CURSOR.to_string();
        }
        // plan() clamps limit so offset + limit <= MAX_OFFSET
        cursor::encode(self.offset + self.limit)
    }
}

/// Decode the cursor and compute the window, without touching the collection.
///
/// Positions stop at [`MAX_OFFSET`]: a forward window is cut short there, and
/// a forward request starting at it plans nothing.
pub fn plan<E>(request: &PageRequest) -> Result<Plan, PaginationError<E>> {
    if request.page_size == 0 {
        return Err(PaginationError::InvalidPageSize(0));
    }

    let offset = cursor::decode(&request.cursor).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected malformed cursor");
    })?;

    if request.previous {
        if offset == 0 {
            return Ok(Plan::Empty);
        }
        let limit = request.page_size.min(offset);
        return Ok(Plan::Fetch(Window {
            offset,
            skip: offset - limit,
            limit,
            previous: true,
        }));
    }

    // decode() guarantees offset <= MAX_OFFSET
    let limit = request.page_size.min(MAX_OFFSET - offset);
    if limit == 0 {
        return Ok(Plan::Empty);
    }
    Ok(Plan::Fetch(Window {
        offset,
        skip: offset,
        limit,
        previous: false,
    }))
}

/// Fetch one page.
///
/// Issues at most one query against `source`, and none at all for a backward
/// request at the start of the sequence. Collaborator errors are returned as
/// [`PaginationError::Fetch`] without retry.
///
/// When `request.order_by` has no identity attached, the source's
/// [`identity_column`](QuerySource::identity_column) breaks ties.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use cursor_page::{MemoryCollection, OrderBy, PageRequest, Row, paginate};
///
/// let movies: MemoryCollection = [(1, "Star Wars"), (2, "Lord of the Rings")]
///     .into_iter()
///     .map(|(id, name)| Row::new().with("id", id).with("name", name))
///     .collect();
///
/// let page = paginate(&movies, &PageRequest::new(OrderBy::desc("id")).page_size(1))
///     .await
///     .unwrap();
/// assert_eq!(page.next_cursor, "MQ==");
/// # }
/// ```
pub async fn paginate<S: QuerySource>(
    source: &S,
    request: &PageRequest,
) -> Result<PageResult<S::Record>, PaginationError<S::Error>> {
    let window = match plan(request)? {
        Plan::Empty => {
            tracing::debug!(previous = request.previous, "window is empty, no query issued");
            return Ok(PageResult::end());
        },
        Plan::Fetch(window) => window,
    };

    tracing::debug!(
        offset = window.offset,
        skip = window.skip,
        limit = window.limit,
        previous = window.previous,
        order_by = %request.order_by,
        "fetching page window"
    );

    let mut query = source.query();
    for (column, dir) in request.order_by.keys_with(source.identity_column()) {
        query = query.order_by(column, dir.is_descending());
    }
    let rows = query
        .skip(window.skip)
        .limit(window.limit)
        .execute()
        .await
        .map_err(PaginationError::Fetch)?;

    let next_cursor = window.next_cursor(rows.len());
    tracing::debug!(rows = rows.len(), has_next = !next_cursor.is_empty(), "page fetched");
    Ok(PageResult { rows, next_cursor })
}
