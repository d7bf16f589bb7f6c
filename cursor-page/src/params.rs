//! Typed request parameters at the transport boundary.
//!
//! Web frameworks deserialize query strings into [`PageParams`] (for example
//! with an axum `Query<PageParams>` extractor); [`PageParams::into_request`]
//! then applies defaults, limits and the sortable-column whitelist and
//! produces the [`PageRequest`] the engine consumes.

use serde::Deserialize;

use crate::config::PaginationConfig;
use crate::engine::PageRequest;
use crate::error::PaginationError;
use crate::order::OrderBy;

/// Raw pagination parameters as sent by a client.
///
/// Parameter names follow the `__cursor` / `__previous` convention; the
/// unprefixed names are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// Cursor token. Absent or empty means start of the sequence.
    #[serde(default, rename = "__cursor", alias = "cursor")]
    pub cursor: Option<String>,
    /// Any non-empty value walks backward.
    #[serde(default, rename = "__previous", alias = "previous")]
    pub previous: Option<String>,
    /// Requested page size.
    #[serde(default, rename = "__page_size", alias = "page_size")]
    pub page_size: Option<i64>,
    /// Requested order, `column` or `-column`.
    #[serde(default, rename = "__order", alias = "order_by")]
    pub order_by: Option<String>,
}

impl PageParams {
    /// Build the engine request.
    ///
    /// - an absent page size uses `config.default_page_size`, a size `<= 0`
    ///   is rejected, a size above `config.max_page_size` is clamped;
    /// - an absent or empty order uses `default_order`; any other order must
    ///   name a column in `allowed` (an empty `allowed` accepts only the
    ///   default order's column);
    /// - `config.identity_column` is attached as tie-breaker unless the order
    ///   already carries one.
    ///
    /// The cursor itself is decoded later, by [`paginate`](crate::paginate).
    ///
    /// ```
    /// use cursor_page::{OrderBy, PageParams, PaginationConfig};
    ///
    /// let params = PageParams {
    ///     cursor: Some("MQ==".into()),
    ///     previous: Some("yes".into()),
    ///     ..PageParams::default()
    /// };
    /// let request = params
    ///     .into_request::<()>(&PaginationConfig::default(), &OrderBy::desc("id"), &[])
    ///     .unwrap();
    /// assert!(request.previous);
    /// assert_eq!(request.page_size, 20);
    /// ```
    pub fn into_request<E>(
        self,
        config: &PaginationConfig,
        default_order: &OrderBy,
        allowed: &[&str],
    ) -> Result<PageRequest, PaginationError<E>> {
        let page_size = match self.page_size {
            None => config.default_page_size,
            Some(n) if n <= 0 => return Err(PaginationError::InvalidPageSize(n)),
            Some(n) => n.unsigned_abs().min(config.max_page_size),
        };

        let order_by = match self.order_by.as_deref().map(str::trim) {
            None | Some("") => default_order.clone(),
            Some(raw) => {
                let order = OrderBy::parse(raw)?;
                if allowed.is_empty() {
                    order.ensure_allowed(&[default_order.column()])?;
                } else {
                    order.ensure_allowed(allowed)?;
                }
                order
            },
        };
        let order_by = match order_by.identity() {
            Some(_) => order_by,
            None => order_by.with_identity(config.identity_column.as_str())?,
        };

        Ok(PageRequest {
            cursor: self.cursor.unwrap_or_default(),
            previous: self.previous.is_some_and(|v| !v.is_empty()),
            page_size,
            order_by,
        })
    }
}
