// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help output specs

use crate::prelude::*;

#[test]
fn bw_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("generate")
        .stdout_has("run")
        .stdout_has("ledger")
        .stdout_has("compile");
}

#[test]
fn bw_without_command_prints_usage_and_fails() {
    cli().fails().code(2).stderr_has("Usage:");
}

#[test]
fn bw_ledger_help_shows_subcommands() {
    cli().args(&["ledger", "--help"]).passes().stdout_has("list").stdout_has("reset");
}

#[test]
fn bw_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}
