// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw validate`: check config, catalog and style profile without running.

use super::Context;
use anyhow::Result;

pub fn handle(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog()?;
    let compiler = ctx.validated_compiler()?;
    let budget = compiler.budget();
    println!(
        "ok: {} topics, {} pages per job, budgets {}/{} ({})",
        catalog.len(),
        ctx.settings.pipeline.pages_per_job,
        budget.instruction,
        budget.exclusions,
        budget.counter,
    );
    if ctx.settings.generator.is_none() || ctx.settings.assembler.is_none() {
        println!("note: [generator] and [assembler] commands are required for `bw run`");
    }
    Ok(())
}
