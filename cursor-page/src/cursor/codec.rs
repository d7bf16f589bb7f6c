//! Offset <-> token codec.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Maximum allowed cursor size in bytes (4KB).
/// This prevents DoS attacks via oversized cursor payloads.
pub(crate) const MAX_CURSOR_SIZE: usize = 4 * 1024;

/// Largest offset a cursor may carry.
///
/// SQL `LIMIT`/`OFFSET` take signed 64-bit integers.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// URL-safe alphabet, padded on encode, padding optional on decode.
///
/// Offset `1` encodes to `MQ==`, the same token as plain base64, so cursors
/// handed out by earlier deployments keep decoding.
const TOKEN: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors that can occur when decoding a cursor token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The token exceeds the maximum allowed size.
    #[error("cursor exceeds maximum size ({}KB limit)", MAX_CURSOR_SIZE / 1024)]
    TooLarge,
    /// The token is not valid base64.
    #[error("invalid base64 encoding in cursor")]
    InvalidBase64,
    /// The decoded payload is not a non-negative decimal offset.
    #[error("cursor does not hold a valid offset")]
    InvalidOffset,
}

/// Encode an offset as an opaque, URL-safe cursor token.
///
/// Never returns the empty string: `encode(0)` is a real cursor pointing at
/// the first row, distinct from the "no further page" sentinel.
///
/// ```
/// use cursor_page::{decode, encode};
///
/// assert_eq!(encode(1), "MQ==");
/// assert_eq!(decode(&encode(42)).unwrap(), 42);
/// ```
#[must_use]
pub fn encode(offset: u64) -> String {
    TOKEN.encode(offset.to_string())
}

/// Decode a cursor token into an offset.
///
/// The empty token means "start of the sequence" and decodes to `0`.
/// Anything else must decode to a decimal offset no larger than
/// [`MAX_OFFSET`]; malformed tokens are an error, never offset `0`.
///
/// ```
/// use cursor_page::{CursorError, decode};
///
/// assert_eq!(decode("").unwrap(), 0);
/// assert_eq!(decode("MQ==").unwrap(), 1);
/// assert_eq!(decode("MQ").unwrap(), 1);
/// assert_eq!(decode("not base64!"), Err(CursorError::InvalidBase64));
/// ```
pub fn decode(token: &str) -> Result<u64, CursorError> {
    if token.is_empty() {
        return Ok(0);
    }
    // Check size before decoding to prevent DoS attacks
    if token.len() > MAX_CURSOR_SIZE {
        return Err(CursorError::TooLarge);
    }
    let payload = TOKEN
        .decode(token)
        .map_err(|_| CursorError::InvalidBase64)?;
    parse_offset(&payload)
}

/// Parse the decoded payload. Only a non-empty run of ASCII digits is
/// accepted; signs, whitespace and exponents are rejected.
fn parse_offset(payload: &[u8]) -> Result<u64, CursorError> {
    if payload.is_empty() || !payload.iter().all(u8::is_ascii_digit) {
        return Err(CursorError::InvalidOffset);
    }
    let text = std::str::from_utf8(payload).map_err(|_| CursorError::InvalidOffset)?;
    let offset: u64 = text.parse().map_err(|_| CursorError::InvalidOffset)?;
    if offset > MAX_OFFSET {
        return Err(CursorError::InvalidOffset);
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(payload: &str) -> String {
        TOKEN.encode(payload)
    }

    #[test]
    fn test_encode_matches_reference_tokens() {
        assert_eq!(encode(0), "MA==");
        assert_eq!(encode(1), "MQ==");
        assert_eq!(encode(10), "MTA=");
        assert_eq!(encode(100), "MTAw");
    }

    #[test]
    fn test_empty_token_is_start() {
        assert_eq!(decode(""), Ok(0));
    }

    #[test]
    fn test_encode_zero_is_not_the_sentinel() {
        assert!(!encode(0).is_empty());
        assert_eq!(decode(&encode(0)), Ok(0));
    }

    #[test]
    fn test_decode_accepts_unpadded() {
        assert_eq!(decode("MQ"), Ok(1));
        assert_eq!(decode("MTA"), Ok(10));
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert_eq!(decode("not valid base64!!!"), Err(CursorError::InvalidBase64));
        assert_eq!(decode("M"), Err(CursorError::InvalidBase64));
    }

    #[test]
    fn test_decode_rejects_non_numeric_payloads() {
        for payload in ["-1", "+1", " 1", "1 ", "1.5", "1e3", "abc", "0x10", "{\"id\":1}"] {
            assert_eq!(
                decode(&raw(payload)),
                Err(CursorError::InvalidOffset),
                "payload {payload:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        // "=" style tokens that decode to zero bytes
        assert!(decode("====").is_err());
    }

    #[test]
    fn test_decode_offset_limits() {
        assert_eq!(decode(&encode(MAX_OFFSET)), Ok(MAX_OFFSET));
        assert_eq!(
            decode(&raw(&(MAX_OFFSET + 1).to_string())),
            Err(CursorError::InvalidOffset)
        );
        assert_eq!(
            decode(&raw("99999999999999999999999")),
            Err(CursorError::InvalidOffset)
        );
    }

    #[test]
    fn test_decode_too_large() {
        let oversized = "A".repeat(MAX_CURSOR_SIZE + 1);
        assert_eq!(decode(&oversized), Err(CursorError::TooLarge));

        // Exactly at the limit is decoded, and fails for a different reason
        let at_limit = "A".repeat(MAX_CURSOR_SIZE);
        assert_ne!(decode(&at_limit), Err(CursorError::TooLarge));
    }
}
