//! Opaque position tokens.
//!
//! A cursor is the whole pagination state: the offset of the next row to
//! read in the ordered result set. Clients receive it base64-encoded and must
//! treat it as opaque.
//!
//! The empty string is the sentinel. Sent by a client it means "start of the
//! sequence"; returned by the engine it means "no further page in this
//! direction". [`encode`] never produces it.

mod codec;

use std::fmt;
use std::str::FromStr;

pub use codec::{CursorError, MAX_OFFSET, decode, encode};

/// The sentinel cursor: start of sequence on input, end of pages on output.
pub const END_CURSOR: &str = "";

/// A decoded cursor.
///
/// # Security Note
///
/// Cursors use simple base64 encoding, **not encryption**. A client can read
/// and forge the offset. That is harmless for positional pagination (a forged
/// offset only skips rows the client could page to anyway), but do not rely
/// on cursors to hide data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[must_use = "cursor must be encoded with .encode() or placed in a PageRequest"]
pub struct Cursor {
    offset: u64,
}

impl Cursor {
    /// Cursor at the start of the sequence.
    pub const fn start() -> Self {
        Self { offset: 0 }
    }

    /// Cursor at an explicit offset.
    ///
    /// Offsets above [`MAX_OFFSET`] are clamped.
    pub const fn at(offset: u64) -> Self {
        let offset = if offset > MAX_OFFSET {
            MAX_OFFSET
        } else {
            offset
        };
        Self { offset }
    }

    /// Parse a client token. The empty token is [`Cursor::start`].
    pub fn parse(token: &str) -> Result<Self, CursorError> {
        decode(token).map(|offset| Self { offset })
    }

    /// The offset this cursor points at.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Encode into an opaque token.
    #[must_use]
    pub fn encode(&self) -> String {
        encode(self.offset)
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
