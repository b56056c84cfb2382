// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw compile`: show what the generator would receive for one page.

use super::Context;
use crate::color;
use anyhow::Result;
use bw_core::PageSpec;
use bw_prompt::CompiledText;
use clap::Args;

#[derive(Args)]
pub struct CompileArgs {
    /// Page subject, e.g. "Golden Retriever"
    pub subject: String,
    /// Scene description; defaults to the subject
    pub scene: Option<String>,
    /// Compile with the cover style
    #[arg(long)]
    pub cover: bool,
    /// Also show fragments dropped for lack of budget
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

pub fn handle(ctx: &Context, args: CompileArgs) -> Result<()> {
    let compiler = ctx.validated_compiler()?;
    let scene = args.scene.unwrap_or_else(|| args.subject.clone());
    let page = if args.cover {
        PageSpec::cover(args.subject, scene)
    } else {
        PageSpec::content(args.subject, scene)
    };

    let prompt = compiler.compile(&page).map_err(super::validation_error)?;
    let budget = compiler.budget();
    print_text("instruction", &prompt.instruction, budget.instruction, args.verbose);
    print_text("exclusions", &prompt.exclusions, budget.exclusions, args.verbose);
    Ok(())
}

fn print_text(label: &str, text: &CompiledText, budget: usize, verbose: bool) {
    println!("{} {}", color::header(label), color::muted(&format!("({}/{budget})", text.cost)));
    println!("{}", text.text);
    if verbose && !text.dropped.is_empty() {
        println!("{} {}", color::muted("dropped:"), text.dropped.join(" | "));
    }
}
