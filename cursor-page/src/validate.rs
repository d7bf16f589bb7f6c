//! SQL identifier validation.
//!
//! Sort columns end up interpolated into `ORDER BY`, so every column and
//! table name that reaches the SQL renderer goes through here. This is not a
//! whitelist: which columns a client may sort by is decided at the transport
//! boundary (see [`PageParams`](crate::PageParams)).

/// Longest name accepted; Postgres truncates identifiers past 63 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Whether `s` can be placed unquoted in SQL as a table or column name.
///
/// Accepts 1 to 63 ASCII letters, digits and underscores, not starting with
/// a digit. Quoting, schema-qualified names and non-ASCII are not supported.
///
/// ```
/// use cursor_page::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("rating"));
/// assert!(is_valid_sql_identifier("_created_at"));
///
/// assert!(!is_valid_sql_identifier(""));
/// assert!(!is_valid_sql_identifier("-id"));
/// assert!(!is_valid_sql_identifier("id; DROP TABLE movie"));
/// ```
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_IDENTIFIER_LEN {
        return false;
    }
    match bytes.split_first() {
        Some((head, tail)) if head.is_ascii_alphabetic() || *head == b'_' => tail
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_'),
        _ => false,
    }
}

/// Panic unless `s` passes [`is_valid_sql_identifier`].
///
/// For names fixed in code, such as tables, projected fields and identity
/// columns. `context` names the kind of identifier in the panic message.
/// Client-chosen sort columns go through [`OrderBy::parse`](crate::OrderBy::parse)
/// instead, which returns an error.
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_sql_identifier(s),
        "Invalid SQL {context} name '{s}': expected 1-{MAX_IDENTIFIER_LEN} ASCII \
         letters, digits or underscores, not starting with a digit"
    );
}
