//! Property tests for the cursor codec and page walks.
//!
//! Run with: `cargo test -p cursor-page --test proptest_paginate`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use cursor_page::{
    MAX_OFFSET, MemoryCollection, OrderBy, PageRequest, PageResult, Row, SortDir, Value, decode,
    encode, paginate,
};
use proptest::prelude::*;

// =========================================================================
// HELPERS
// =========================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// Rows with a unique `id` and a low-cardinality `rating`, so ties are common.
fn collection(ratings: &[i64]) -> MemoryCollection {
    ratings
        .iter()
        .zip(1i64..)
        .map(|(rating, id)| Row::new().with("id", id).with("rating", *rating))
        .collect()
}

/// Ids in the order `rating` then `id` (both in `dir`) would return them.
fn expected_ids(ratings: &[i64], dir: SortDir) -> Vec<i64> {
    let mut keyed: Vec<(i64, i64)> = ratings.iter().copied().zip(1i64..).collect();
    keyed.sort_unstable();
    if dir.is_descending() {
        keyed.reverse();
    }
    keyed.into_iter().map(|(_, id)| id).collect()
}

fn ids(page: &PageResult<Row>) -> Vec<i64> {
    page.rows
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_int))
        .collect()
}

fn order(dir: SortDir) -> OrderBy {
    let order = match dir {
        SortDir::Asc => OrderBy::asc("rating"),
        SortDir::Desc => OrderBy::desc("rating"),
    };
    order.with_identity("id").unwrap()
}

fn any_dir() -> impl Strategy<Value = SortDir> {
    prop_oneof![Just(SortDir::Asc), Just(SortDir::Desc)]
}

// =========================================================================
// CODEC
// =========================================================================

proptest! {
    /// Every offset in range survives a round trip.
    #[test]
    fn cursor_round_trips(offset in 0..=MAX_OFFSET) {
        let token = encode(offset);
        prop_assert!(!token.is_empty());
        prop_assert_eq!(decode(&token).unwrap(), offset);
    }

    /// Padding is optional on decode.
    #[test]
    fn cursor_decodes_without_padding(offset in 0..=MAX_OFFSET) {
        let token = encode(offset);
        prop_assert_eq!(decode(token.trim_end_matches('=')).unwrap(), offset);
    }

    /// Arbitrary client input never panics and never yields an out-of-range offset.
    #[test]
    fn decode_doesnt_panic_on_arbitrary_strings(input in ".{0,64}") {
        if let Ok(offset) = decode(&input) {
            prop_assert!(offset <= MAX_OFFSET);
        }
    }

    /// Non-numeric payloads are rejected.
    #[test]
    fn decode_rejects_non_numeric_payload(payload in "[a-zA-Z+ -]{1,20}") {
        use base64::Engine as _;
        let token = base64::engine::general_purpose::URL_SAFE.encode(payload);
        prop_assert!(decode(&token).is_err());
    }
}

// =========================================================================
// PAGE WALKS
// =========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Walking forward from the start visits every row exactly once, in order.
    #[test]
    fn forward_walk_visits_every_row_once(
        ratings in prop::collection::vec(0i64..4, 0..40),
        page_size in 1u64..8,
        dir in any_dir(),
    ) {
        let source = collection(&ratings);
        let request = PageRequest::new(order(dir)).page_size(page_size);

        let mut seen = Vec::new();
        let mut cursor = String::new();
        for _ in 0..=ratings.len() {
            let page = block_on(paginate(&source, &request.clone().cursor(cursor.as_str()))).unwrap();
            prop_assert!(page.rows.len() as u64 <= page_size);
            seen.extend(ids(&page));
            if !page.has_next() {
                break;
            }
            cursor = page.next_cursor;
        }

        prop_assert_eq!(seen, expected_ids(&ratings, dir));
    }

    /// Walking backward from the end visits every row exactly once; each page
    /// keeps the requested order.
    #[test]
    fn backward_walk_visits_every_row_once(
        ratings in prop::collection::vec(0i64..4, 1..40),
        page_size in 1u64..8,
        dir in any_dir(),
    ) {
        let source = collection(&ratings);
        let request = PageRequest::new(order(dir)).page_size(page_size).previous(true);

        let mut pages = Vec::new();
        let mut cursor = encode(ratings.len() as u64);
        for _ in 0..=ratings.len() {
            let page = block_on(paginate(&source, &request.clone().cursor(cursor.as_str()))).unwrap();
            prop_assert!(!page.rows.is_empty());
            pages.push(ids(&page));
            if !page.has_next() {
                break;
            }
            cursor = page.next_cursor;
        }

        let seen: Vec<i64> = pages.into_iter().rev().flatten().collect();
        prop_assert_eq!(seen, expected_ids(&ratings, dir));
    }

    /// A backward page from the cursor a forward page returned ends where
    /// that forward page ended.
    #[test]
    fn backward_page_mirrors_forward_page(
        ratings in prop::collection::vec(0i64..4, 1..40),
        page_size in 1u64..8,
        dir in any_dir(),
    ) {
        let source = collection(&ratings);
        let forward = PageRequest::new(order(dir)).page_size(page_size);

        let first = block_on(paginate(&source, &forward)).unwrap();
        prop_assume!(first.has_next());

        let back = block_on(paginate(
            &source,
            &forward.clone().cursor(first.next_cursor.as_str()).previous(true),
        ))
        .unwrap();
        prop_assert_eq!(ids(&back), ids(&first));
        prop_assert!(!back.has_next());
    }
}
