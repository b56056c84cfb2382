// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw failed`: failed jobs and why.

use super::Context;
use crate::output::{format_time_ago, print_json, render_table, OutputFormat};
use anyhow::Result;
use bw_core::{Clock, SystemClock};
use clap::Args;

#[derive(Args)]
pub struct FailedArgs {
    #[arg(long)]
    pub json: bool,
}

pub fn handle(ctx: &Context, args: FailedArgs) -> Result<()> {
    let failures = ctx.open_store()?.failures()?;
    match OutputFormat::from_json_flag(args.json) {
        OutputFormat::Json => print_json(&failures)?,
        OutputFormat::Text if failures.is_empty() => println!("no failed jobs"),
        OutputFormat::Text => {
            let now_ms = SystemClock.epoch_ms();
            let rows: Vec<Vec<String>> = failures
                .iter()
                .map(|f| {
                    vec![
                        f.job_id.to_string(),
                        format_time_ago(f.failed_at_ms, now_ms),
                        f.reason.clone(),
                    ]
                })
                .collect();
            println!("{}", render_table(&["JOB", "AGE", "REASON"], &rows));
        }
    }
    Ok(())
}
