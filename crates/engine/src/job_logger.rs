// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only logger for per-job activity logs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bw_core::format_utc_now;

/// Path of the activity log for `job_id` under `log_dir`.
pub fn job_log_path(log_dir: &Path, job_id: &str) -> PathBuf {
    log_dir.join("job").join(format!("{job_id}.log"))
}

/// Append-only logger for per-job activity logs.
///
/// Writes human-readable timestamped lines to:
///   `<log_dir>/job/<job_id>.log`
///
/// A reprocessed job keeps appending to the same file, so the log shows
/// every attempt.
#[derive(Debug, Clone)]
pub struct JobLogger {
    log_dir: PathBuf,
}

impl JobLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Append a log line for the given job.
    ///
    /// Format: `2026-01-30T08:14:09Z [state] message`
    ///
    /// Failures are logged via tracing but do not propagate.
    pub fn append(&self, job_id: &str, state: &str, message: &str) {
        let path = job_log_path(&self.log_dir, job_id);
        if let Err(e) = write_line(&path, state, message) {
            tracing::warn!(job_id, error = %e, "failed to write job log");
        }
    }

    /// Append a fenced block, for multi-line content such as compiled
    /// instructions.
    ///
    /// ```text
    /// {timestamp} [{state}] ```{label}
    /// {content}
    /// {timestamp} [{state}] ```
    /// ```
    pub fn append_fenced(&self, job_id: &str, state: &str, label: &str, content: &str) {
        let path = job_log_path(&self.log_dir, job_id);
        if let Err(e) = write_fenced(&path, state, label, content) {
            tracing::warn!(job_id, error = %e, "failed to write job log");
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_line(path: &Path, state: &str, message: &str) -> std::io::Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "{} [{}] {}", format_utc_now(), state, message)
}

fn write_fenced(path: &Path, state: &str, label: &str, content: &str) -> std::io::Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "{} [{}] ```{}", format_utc_now(), state, label)?;
    write!(file, "{content}")?;
    if !content.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{} [{}] ```", format_utc_now(), state)
}

#[cfg(test)]
#[path = "job_logger_tests.rs"]
mod tests;
