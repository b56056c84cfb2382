// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bw: operator CLI for the bookworks coloring-book pipeline

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    compile::CompileArgs, failed::FailedArgs, generate::GenerateArgs, ledger::LedgerArgs,
    retry::RetryArgs, run::RunArgs, status::StatusArgs, Context,
};
use settings::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bw",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Turn a topic catalog into coloring books",
    styles = color::styles()
)]
struct Cli {
    /// Config file (default: $BW_CONFIG, then <state-dir>/bookworks.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// State directory (default: $BW_STATE_DIR, then $XDG_STATE_HOME/bookworks)
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reserve unused topics and enqueue one job per topic
    Generate(GenerateArgs),
    /// Process pending jobs until interrupted
    Run(RunArgs),
    /// Show job and topic counts
    Status(StatusArgs),
    /// List failed jobs with their reasons
    Failed(FailedArgs),
    /// Move a failed job back to pending
    Retry(RetryArgs),
    /// Inspect or reset the used-topic ledger
    Ledger(LedgerArgs),
    /// Check the config, catalog and style profile against the budgets
    Validate,
    /// Print the compiled instruction and exclusions for one page
    Compile(CompileArgs),
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_error::exit_code(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => env::state_dir()?,
    };
    let log_dir = matches!(cli.command, Commands::Run(_)).then(|| state_dir.join("logs"));
    let _log_guard = logging::init(&env::log_filter(), log_dir.as_deref())?;

    let config = cli.config.or_else(env::config_path);
    let settings = Settings::load(config.as_deref(), &state_dir)?;
    let ctx = Context::new(settings, state_dir);

    match cli.command {
        Commands::Generate(args) => commands::generate::handle(&ctx, args),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(commands::run::handle(&ctx, args))
        }
        Commands::Status(args) => commands::status::handle(&ctx, args),
        Commands::Failed(args) => commands::failed::handle(&ctx, args),
        Commands::Retry(args) => commands::retry::handle(&ctx, args),
        Commands::Ledger(args) => commands::ledger::handle(&ctx, args),
        Commands::Validate => commands::validate::handle(&ctx),
        Commands::Compile(args) => commands::compile::handle(&ctx, args),
    }
}
