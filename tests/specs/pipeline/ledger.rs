// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw ledger` specs

use crate::prelude::*;

#[test]
fn ledger_list_shows_used_topics() {
    let temp = Project::with_cat_pipeline();
    temp.bw().args(&["ledger", "list"]).passes().stdout_has("no topics used yet");

    temp.bw().args(&["generate"]).passes();

    temp.bw().args(&["ledger", "list"]).passes().stdout_has("TOPIC").stdout_has("fruit");
}

#[test]
fn ledger_reset_makes_topics_available_again() {
    let temp = Project::with_cat_pipeline();
    temp.bw().args(&["generate", "--count", "2"]).passes();
    temp.bw().args(&["generate"]).fails().code(3);

    temp.bw().args(&["ledger", "reset"]).passes().stdout_has("forgot 2 topic(s)");

    temp.bw().args(&["generate"]).passes().stdout_has("fruit");
    assert!(temp.state_path("ledger.bak").exists());
}
