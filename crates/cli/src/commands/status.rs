// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw status`: job and topic counts.

use super::Context;
use crate::color;
use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use bw_core::Catalog;
use bw_storage::{Ledger, StoreCounts};
use clap::Args;
use serde::Serialize;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCounts {
    pub total: usize,
    pub used: usize,
    pub unused: usize,
}

impl TopicCounts {
    /// Ledger entries for topics no longer in the catalog are not counted.
    pub fn new(catalog: &Catalog, ledger: &Ledger) -> Self {
        let used = catalog.ids().filter(|id| ledger.contains(id)).count();
        Self { total: catalog.len(), used, unused: catalog.len() - used }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    jobs: StoreCounts,
    topics: TopicCounts,
}

pub fn handle(ctx: &Context, args: StatusArgs) -> Result<()> {
    let jobs = ctx.open_store()?.counts()?;
    let topics = TopicCounts::new(&ctx.catalog()?, &ctx.open_ledger()?);
    let report = StatusReport { jobs, topics };

    match OutputFormat::from_json_flag(args.json) {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print!("{}", format_report(&report)),
    }
    Ok(())
}

fn format_report(report: &StatusReport) -> String {
    let StatusReport { jobs, topics } = report;
    format!(
        "{}\n  pending  {}\n  done     {}\n  failed   {}\n{}\n  used     {}\n  unused   {}  {}\n",
        color::header("Jobs"),
        jobs.pending,
        jobs.done,
        jobs.failed,
        color::header("Topics"),
        topics.used,
        topics.unused,
        color::muted(&format!("of {}", topics.total)),
    )
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
