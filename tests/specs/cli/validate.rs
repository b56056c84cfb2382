// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw validate` specs

use crate::prelude::*;

#[test]
fn builtin_defaults_validate() {
    let temp = Project::empty();

    temp.bw().args(&["validate"]).passes().stdout_has("ok: 18 topics");
}

#[test]
fn budget_too_small_for_essentials_exits_with_validation_code() {
    let temp = Project::empty();
    temp.file("bookworks.toml", "[budget]\ninstruction = 5\n");

    temp.bw()
        .args(&["validate"])
        .fails()
        .code(2)
        .stderr_has("essential fragments of");
}

#[test]
fn unknown_config_key_is_rejected() {
    let temp = Project::empty();
    temp.file("bookworks.toml", "[pipeline]\npages = 4\n");

    temp.bw().args(&["validate"]).fails().code(1).stderr_has("invalid config");
}

#[test]
fn explicit_config_flag_is_honored() {
    let temp = Project::empty();
    temp.file("custom/bw.toml", "[topics]\ncatalog = \"topics.toml\"\n");
    temp.file("custom/topics.toml", FRUIT_AND_ANIMALS);
    let config = temp.state_path("custom/bw.toml");

    temp.bw()
        .args(&["--config", config.to_str().unwrap(), "validate"])
        .passes()
        .stdout_has("ok: 2 topics");
}
