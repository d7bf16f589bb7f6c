// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self by design
#![allow(clippy::match_same_arms)] // Intentional for clarity in some match expressions
#![allow(clippy::cast_precision_loss)] // Int/float comparison in Value ordering
#![allow(clippy::cast_possible_truncation)] // Window sizes are bounded by MAX_OFFSET
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! # cursor-page - Bidirectional Offset-Cursor Pagination
//!
//! Pages through any ordered, queryable collection with opaque cursor
//! tokens, walking forward or backward from a client-supplied cursor.
//!
//! - [`paginate`] issues at most one skip/limit query per page.
//! - Cursors are URL-safe base64 of the row offset; `""` means "start" on
//!   input and "no further page" on output.
//! - The engine is generic over a [`QuerySource`]. [`MemoryCollection`] and,
//!   with the `sqlite` feature, [`SqliteSource`] are provided.
//!
//! ## Quick Start
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use cursor_page::prelude::*;
//!
//! let movies: MemoryCollection = [(1, "Star Wars"), (2, "Lord of the Rings")]
//!     .into_iter()
//!     .map(|(id, name)| Row::new().with("id", id).with("name", name))
//!     .collect();
//!
//! // First page, newest first
//! let request = PageRequest::new(OrderBy::desc("id")).page_size(1);
//! let page = paginate(&movies, &request).await.unwrap();
//! assert_eq!(page.rows[0].get("name"), Some(&Value::from("Lord of the Rings")));
//! assert_eq!(page.next_cursor, "MQ==");
//!
//! // Walking back from there returns the same row, and nothing before it
//! let back = paginate(&movies, &request.clone().cursor("MQ==").previous(true))
//!     .await
//!     .unwrap();
//! assert_eq!(back.rows, page.rows);
//! assert!(!back.has_next());
//! # }
//! ```
//!
//! ## Transport Boundary
//!
//! [`PageParams`] deserializes `__cursor`, `__previous`, `__page_size` and
//! `__order` request parameters and turns them into a [`PageRequest`] under a
//! [`PaginationConfig`]. Send [`PageResult::header`] back as the
//! `next_cursor` response header.
//!
//! ## SQL
//!
//! [`SelectQuery`] renders the windowed query for Postgres (`$1`) or
//! `SQLite` (`?1`) placeholders. Every identifier is validated, every value
//! is bound as a parameter.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for each planned window and
//! executed statement, `warn` for rejected cursors. Install any subscriber to
//! see them.

mod config;
mod cursor;
mod engine;
mod error;
mod memory;
mod order;
mod params;
mod query;
mod sql;
#[cfg(feature = "sqlite")]
mod sqlite;
mod validate;
mod value;

pub use config::{ConfigError, PaginationConfig};
pub use cursor::{Cursor, CursorError, END_CURSOR, MAX_OFFSET, decode, encode};
pub use engine::{NEXT_CURSOR_HEADER, PageRequest, PageResult, Plan, Window, paginate, plan};
pub use error::PaginationError;
pub use memory::{MemoryCollection, MemoryQuery};
pub use order::{OrderBy, OrderError, SortDir};
pub use params::PageParams;
pub use query::{QuerySource, WindowQuery};
pub use sql::{
    Dialect, Filter, Operator, Postgres, QueryResult, SelectQuery, Sqlite, postgres, sqlite,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteError, SqliteQuery, SqliteSource};
pub use validate::{assert_valid_sql_identifier, is_valid_sql_identifier};
pub use value::{Row, Value};

/// Prelude module for convenient imports.
///
/// ```
/// use cursor_page::prelude::*;
///
/// let request = PageRequest::new(OrderBy::parse("-rating").unwrap());
/// assert_eq!(request.order_by.dir(), SortDir::Desc);
/// ```
pub mod prelude {
    pub use crate::{
        Cursor, CursorError, MemoryCollection, OrderBy, PageParams, PageRequest, PageResult,
        PaginationConfig, PaginationError, QuerySource, Row, SortDir, Value, WindowQuery,
        paginate,
    };

    #[cfg(feature = "sqlite")]
    pub use crate::SqliteSource;
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
