// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw ledger`: inspect or reset the used-topic ledger.

use super::Context;
use crate::output::{print_json, render_table, OutputFormat};
use anyhow::Result;
use bw_core::format_epoch_ms;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct LedgerArgs {
    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand)]
pub enum LedgerCommand {
    /// List used topics, oldest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Forget every used topic; the old ledger is kept as a backup
    Reset,
}

pub fn handle(ctx: &Context, args: LedgerArgs) -> Result<()> {
    let mut ledger = ctx.open_ledger()?;
    match args.command {
        LedgerCommand::List { json } => {
            let used = ledger.used();
            match OutputFormat::from_json_flag(json) {
                OutputFormat::Json => print_json(&used)?,
                OutputFormat::Text if used.is_empty() => println!("no topics used yet"),
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = used
                        .iter()
                        .map(|u| vec![u.topic_id.clone(), format_epoch_ms(u.first_used_at_ms)])
                        .collect();
                    println!("{}", render_table(&["TOPIC", "FIRST USED"], &rows));
                }
            }
        }
        LedgerCommand::Reset => {
            let forgotten = ledger.len();
            let backup = ledger.reset()?;
            println!("forgot {forgotten} topic(s); previous ledger saved to {}", backup.display());
        }
    }
    Ok(())
}
