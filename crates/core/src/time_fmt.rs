// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp and duration formatting shared by logs and CLI output.

use chrono::{TimeZone, Utc};

/// Format epoch milliseconds as `2026-01-30T08:14:09Z`.
pub fn format_epoch_ms(epoch_ms: u64) -> String {
    match Utc.timestamp_millis_opt(epoch_ms as i64).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => "-".to_string(),
    }
}

/// Format the current UTC time as `2026-01-30T08:14:09Z`.
pub fn format_utc_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format elapsed seconds compactly: `45s`, `3m`, `2h`, `5d`.
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
