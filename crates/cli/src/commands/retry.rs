// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw retry`: move a failed job back to the pending queue.

use super::Context;
use anyhow::Result;
use bw_core::JobId;
use clap::Args;

#[derive(Args)]
pub struct RetryArgs {
    /// Failed job id, e.g. job-0a1b2c3d4e5f6g7h
    pub job_id: String,
}

pub fn handle(ctx: &Context, args: RetryArgs) -> Result<()> {
    let job_id = JobId::parse(&args.job_id)
        .ok_or_else(|| anyhow::anyhow!("invalid job id '{}'", args.job_id))?;
    ctx.open_store()?.retry_failed(&job_id)?;
    println!("{job_id} moved back to pending");
    Ok(())
}
