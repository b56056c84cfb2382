// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running external collaborator commands with a deadline.

use serde::Deserialize;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default deadline for one generator invocation.
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(600);

/// Default deadline for one assembler invocation.
pub const ASSEMBLE_TIMEOUT: Duration = Duration::from_secs(120);

/// External program plus arguments, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Overrides the per-adapter default deadline.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), timeout_ms: None }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or(default)
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Run `cmd` to completion, feeding `stdin`, killing it after `timeout`.
///
/// Errors are rendered as strings naming `label`; a non-zero exit is not an
/// error here, callers inspect `Output::status`.
pub async fn run_with_timeout(
    mut cmd: Command,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
    label: &str,
) -> Result<Output, String> {
    cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| format!("{label}: failed to spawn: {e}"))?;
    if let (Some(bytes), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // A child that exits without reading stdin is reported via its status.
        if let Err(e) = pipe.write_all(&bytes).await {
            tracing::debug!(label, error = %e, "stdin write interrupted");
        }
        drop(pipe);
    }

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{label}: {e}")),
        Err(_) => Err(format!("{label}: timed out after {}s", timeout.as_secs())),
    }
}

/// Short, single-line summary of a failed command's stderr.
pub(crate) fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    match output.status.code() {
        Some(code) if last.is_empty() => format!("exit code {code}"),
        Some(code) => format!("exit code {code}: {last}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
