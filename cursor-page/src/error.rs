//! Pagination errors.

use crate::cursor::CursorError;
use crate::order::OrderError;

/// Errors returned by [`paginate`](crate::paginate) and the transport helpers.
///
/// `E` is the query collaborator's own error type, carried unchanged in
/// [`PaginationError::Fetch`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PaginationError<E> {
    /// The cursor token could not be decoded.
    #[error("malformed cursor: {0}")]
    MalformedCursor(#[from] CursorError),
    /// The requested page size is not a positive integer.
    #[error("invalid page size {0}: must be a positive integer")]
    InvalidPageSize(i64),
    /// The order specification is malformed or not allowed.
    #[error("invalid order_by: {0}")]
    InvalidOrderBy(#[from] OrderError),
    /// The query collaborator failed.
    #[error("collection fetch failed: {0}")]
    Fetch(#[source] E),
}

impl<E> PaginationError<E> {
    /// Returns `true` if the caller sent bad input (map to a 4xx).
    ///
    /// Only [`PaginationError::Fetch`] is a server-side failure.
    #[inline]
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Fetch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset;

    #[test]
    fn test_client_error_classification() {
        let malformed: PaginationError<Reset> = CursorError::InvalidBase64.into();
        assert!(malformed.is_client_error());
        assert!(PaginationError::<Reset>::InvalidPageSize(0).is_client_error());
        assert!(!PaginationError::Fetch(Reset).is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let malformed: PaginationError<Reset> = CursorError::InvalidOffset.into();
        assert_eq!(
            malformed.to_string(),
            "malformed cursor: cursor does not hold a valid offset"
        );
        assert_eq!(
            PaginationError::Fetch(Reset).to_string(),
            "collection fetch failed: connection reset"
        );
    }

    #[test]
    fn test_fetch_source_is_preserved() {
        use std::error::Error as _;
        let err = PaginationError::Fetch(Reset);
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
    }
}
