// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn new_ids_carry_prefix_and_random_suffix() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.suffix().len(), ID_RANDOM_LEN);
    assert!(is_safe_stem(id.as_str()));
}

#[test]
fn new_ids_are_unique() {
    let ids: HashSet<_> = (0..200).map(|_| TestId::new()).collect();
    assert_eq!(ids.len(), 200);
}

#[test]
fn borrow_allows_str_lookup() {
    let mut set = HashSet::new();
    set.insert(TestId::from_string("tst-abc"));
    assert!(set.contains("tst-abc"));
}

#[test]
fn short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijkl");
    assert_eq!(id.short(8), "abcdefgh");
    assert_eq!(TestId::from_string("tst-abc").short(8), "abc");
}

#[test]
fn suffix_without_prefix_is_whole_id() {
    assert_eq!(TestId::from_string("plain").suffix(), "plain");
}

#[yare::parameterized(
    plain      = { "job-abc123",        true },
    underscore = { "job_1",             true },
    empty      = { "",                  false },
    dot_dot    = { "..",                false },
    slash      = { "job/../../etc",     false },
    space      = { "job 1",             false },
    dotted     = { "job.json",          false },
    too_long   = { &"a".repeat(65),     false },
)]
fn safe_stem(input: &str, expected: bool) {
    assert_eq!(is_safe_stem(input), expected);
    assert_eq!(TestId::parse(input).is_some(), expected);
}

#[test]
fn serde_is_transparent() {
    let id = TestId::from_string("tst-x");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"tst-x\"");
}
