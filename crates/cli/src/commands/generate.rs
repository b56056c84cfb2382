// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw generate`: reserve topics and enqueue jobs for them.

use super::Context;
use crate::exit_error::ExitError;
use crate::output::{print_json, OutputFormat};
use anyhow::Result;
use bw_core::{JobDescriptor, SystemClock};
use bw_engine::{GeneratorError, TopicGenerator};
use clap::Args;
use std::sync::Arc;

/// Consecutive lost reservations tolerated before giving up.
const MAX_CONTENDED: u32 = 3;

#[derive(Args)]
pub struct GenerateArgs {
    /// Number of jobs to enqueue
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
    /// Print the descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle(ctx: &Context, args: GenerateArgs) -> Result<()> {
    let store = Arc::new(ctx.open_store()?);
    let mut generator = TopicGenerator::new(
        ctx.catalog()?,
        ctx.open_ledger()?,
        store,
        ctx.settings.generator_config(),
        SystemClock,
    )?;

    let mut created: Vec<JobDescriptor> = Vec::with_capacity(args.count);
    let mut exhausted = false;
    let mut contended = 0;
    while created.len() < args.count {
        match generator.generate() {
            Ok(job) => {
                contended = 0;
                created.push(job);
            }
            Err(GeneratorError::Exhausted) => {
                exhausted = true;
                break;
            }
            Err(GeneratorError::Contended(topic_id)) if contended < MAX_CONTENDED => {
                contended += 1;
                tracing::warn!(%topic_id, "topic taken by another generator, picking again");
            }
            Err(e) => return Err(e.into()),
        }
    }

    match OutputFormat::from_json_flag(args.json) {
        OutputFormat::Json => print_json(&created)?,
        OutputFormat::Text => {
            for job in &created {
                println!("{}  {}  {}", job.job_id, job.topic_id, job.title);
            }
        }
    }

    if exhausted {
        return Err(ExitError::exhausted(format!(
            "topic catalog exhausted after {} new job(s); run `bw ledger reset` to start over",
            created.len()
        ))
        .into());
    }
    Ok(())
}
