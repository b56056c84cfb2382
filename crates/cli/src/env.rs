// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;
use std::time::Duration;

/// Resolve state directory: BW_STATE_DIR > XDG_STATE_HOME/bookworks > ~/.local/state/bookworks
pub fn state_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = non_empty("BW_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("bookworks"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/bookworks"))
        .ok_or_else(|| anyhow::anyhow!("cannot resolve state directory: set BW_STATE_DIR"))
}

/// Config file named by `BW_CONFIG`.
pub fn config_path() -> Option<PathBuf> {
    non_empty("BW_CONFIG").map(PathBuf::from)
}

/// Poll interval override for the runner.
pub fn poll_interval() -> Option<Duration> {
    non_empty("BW_POLL_INTERVAL_MS")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Log filter directive (`BW_LOG`, default `info`).
pub fn log_filter() -> String {
    non_empty("BW_LOG").unwrap_or_else(|| "info".to_string())
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
