// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw run`: drive the pipeline runner.

use super::{ensure_dir, Context};
use anyhow::{Context as _, Result};
use bw_adapters::{CommandAssembler, CommandGenerator};
use bw_core::SystemClock;
use bw_engine::{JobLogger, JobOutcome, PipelineRunner};
use clap::Args;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const RUNNER_LOCK: &str = "runner.lock";

#[derive(Args)]
pub struct RunArgs {
    /// Process one cycle of pending jobs and exit
    #[arg(long)]
    pub once: bool,
}

/// Take the single-runner lock and record our PID in it.
///
/// The file is opened without truncation so a refused second runner does not
/// wipe the PID of the one holding the lock.
pub fn acquire_runner_lock(state_dir: &Path) -> Result<File> {
    ensure_dir(state_dir)?;
    let path = state_dir.join(RUNNER_LOCK);
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    FileExt::try_lock_exclusive(&lock_file).with_context(|| {
        let holder = std::fs::read_to_string(&path).unwrap_or_default();
        format!("another runner holds {} (pid {})", path.display(), holder.trim())
    })?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

pub async fn handle(ctx: &Context, args: RunArgs) -> Result<()> {
    let compiler = ctx.validated_compiler()?;
    let generator_spec = ctx
        .settings
        .generator
        .clone()
        .context("no [generator] command configured")?;
    let assembler_spec = ctx
        .settings
        .assembler
        .clone()
        .context("no [assembler] command configured")?;

    let _lock = acquire_runner_lock(&ctx.state_dir)?;

    let work_dir = ctx.state_dir.join("work");
    ensure_dir(&work_dir)?;
    let config = ctx.settings.runner_config(&ctx.state_dir);
    ensure_dir(&config.output_dir)?;

    let runner = PipelineRunner::new(
        Arc::new(ctx.open_store()?),
        compiler,
        CommandGenerator::new(generator_spec),
        CommandAssembler::new(assembler_spec, work_dir),
        config,
        JobLogger::new(ctx.logs_dir()),
        SystemClock,
    );

    let cancel = CancellationToken::new();
    tokio::spawn(forward_shutdown_signal(cancel.clone()));

    if args.once {
        let outcomes = runner.run_once(&cancel).await?;
        if outcomes.is_empty() {
            println!("no pending jobs");
        }
        for (job_id, outcome) in outcomes {
            match outcome {
                JobOutcome::Completed { artifact } => {
                    println!("{job_id}  done  {}", artifact.display())
                }
                JobOutcome::Failed { reason } => println!("{job_id}  failed  {reason}"),
                JobOutcome::Cancelled => println!("{job_id}  cancelled"),
                JobOutcome::Requeued { error } => println!("{job_id}  requeued  {error}"),
            }
        }
    } else {
        let stats = runner.run_forever(cancel).await;
        info!(
            jobs_completed = stats.jobs_completed,
            jobs_failed = stats.jobs_failed,
            "shutdown complete"
        );
    }
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM. The runner stops at its next state
/// boundary, leaving any unfinished job in `pending/`.
async fn forward_shutdown_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("stop requested, finishing current step");
    token.cancel();
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
