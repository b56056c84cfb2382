// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup for the `bw` binary.
//!
//! Every command logs to stderr. `bw run` also writes a plain-text copy to
//! `<state_dir>/logs/pipeline.log` through a non-blocking appender.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const PIPELINE_LOG: &str = "pipeline.log";

fn build_env_filter(directive: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directive}': {e}"))
}

/// Install the global subscriber. The returned guard flushes the file writer
/// on drop and must live until the process exits.
pub fn init(directive: &str, log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(build_env_filter(directive)?);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, PIPELINE_LOG);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(build_env_filter(directive)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
