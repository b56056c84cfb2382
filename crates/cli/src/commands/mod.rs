// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod compile;
pub mod failed;
pub mod generate;
pub mod ledger;
pub mod retry;
pub mod run;
pub mod status;
pub mod validate;

use crate::exit_error::ExitError;
use crate::settings::Settings;
use anyhow::Context as _;
use bw_core::{Catalog, SystemClock};
use bw_prompt::{CompileError, InstructionCompiler};
use bw_storage::{JobStore, Ledger};
use std::path::{Path, PathBuf};

pub const LEDGER_FILE: &str = "ledger.jsonl";

/// Resolved settings plus the state directory every command works in.
pub struct Context {
    pub settings: Settings,
    pub state_dir: PathBuf,
}

impl Context {
    pub fn new(settings: Settings, state_dir: PathBuf) -> Self {
        Self { settings, state_dir }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.state_dir.join(LEDGER_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn open_store(&self) -> anyhow::Result<JobStore> {
        JobStore::open(&self.state_dir, SystemClock)
            .with_context(|| format!("failed to open job store in {}", self.state_dir.display()))
    }

    pub fn open_ledger(&self) -> anyhow::Result<Ledger> {
        let path = self.ledger_path();
        Ledger::open(&path, SystemClock)
            .with_context(|| format!("failed to open ledger {}", path.display()))
    }

    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        self.settings.catalog()
    }

    /// Compiler whose fragment lists all fit the configured budgets.
    pub fn validated_compiler(&self) -> anyhow::Result<InstructionCompiler> {
        let compiler = self.settings.compiler()?;
        compiler.validate().map_err(validation_error)?;
        Ok(compiler)
    }
}

pub(crate) fn validation_error(err: CompileError) -> anyhow::Error {
    ExitError::validation(format!("style profile does not fit the budget: {err}")).into()
}

pub(crate) fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create {}", path.display()))
}
