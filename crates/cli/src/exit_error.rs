// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, so `main()` stays the only place that terminates the process.

use std::fmt;

/// Configuration or style profile does not fit the budgets.
pub const EXIT_VALIDATION: i32 = 2;
/// Every catalog topic has been used.
pub const EXIT_EXHAUSTED: i32 = 3;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(EXIT_VALIDATION, message)
    }

    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::new(EXIT_EXHAUSTED, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code for an error returned from a command: the carried code for
/// [`ExitError`], 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ExitError>().map_or(1, |e| e.code)
}
