// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bookworks.toml`: pipeline settings with built-in defaults.
//!
//! ```toml
//! [pipeline]
//! pages_per_job = 12
//! poll_interval_ms = 300000
//!
//! [topics]
//! selection = "random"
//! catalog = "catalog.toml"
//!
//! [generator]
//! program = "flux-render"
//! args = ["--steps", "4"]
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use anyhow::Context;
use bw_adapters::CommandSpec;
use bw_core::Catalog;
use bw_engine::{GeneratorConfig, OnExhausted, RunnerConfig, Selection};
use bw_prompt::{Budget, InstructionCompiler, StyleProfile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CATALOG: &str = include_str!("defaults/catalog.toml");
const DEFAULT_STYLE: &str = include_str!("defaults/style.toml");

/// File name looked up in the state directory when no config is given.
pub const CONFIG_FILE: &str = "bookworks.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub topics: TopicSettings,
    pub budget: Budget,
    pub style: StyleSettings,
    pub generator: Option<CommandSpec>,
    pub assembler: Option<CommandSpec>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    pub pages_per_job: usize,
    pub poll_interval_ms: u64,
    pub page_retries: u32,
    pub job_attempts: u32,
    pub fan_out: usize,
    pub max_in_flight: usize,
    pub width: u32,
    pub height: u32,
    pub output_extension: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pages_per_job: 12,
            poll_interval_ms: 300_000,
            page_retries: 2,
            job_attempts: 2,
            fan_out: 1,
            max_in_flight: 1,
            width: 592,
            height: 832,
            output_extension: "pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicSettings {
    pub selection: Selection,
    pub on_exhausted: OnExhausted,
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSettings {
    pub profile: Option<PathBuf>,
}

impl Settings {
    pub fn from_toml_str(content: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.base_dir = base_dir.to_path_buf();
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from `explicit` (must exist), else `<state_dir>/bookworks.toml`
    /// if present, else defaults.
    pub fn load(explicit: Option<&Path>, state_dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = state_dir.join(CONFIG_FILE);
                if !candidate.exists() {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self { base_dir: state_dir.to_path_buf(), ..Self::default() });
                }
                candidate
            }
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Self::from_toml_str(&content, &base_dir)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    fn check(&self) -> anyhow::Result<()> {
        let p = &self.pipeline;
        anyhow::ensure!(p.pages_per_job >= 2, "pipeline.pages_per_job must be at least 2");
        anyhow::ensure!(p.fan_out >= 1, "pipeline.fan_out must be at least 1");
        anyhow::ensure!(p.max_in_flight >= 1, "pipeline.max_in_flight must be at least 1");
        anyhow::ensure!(p.job_attempts >= 1, "pipeline.job_attempts must be at least 1");
        anyhow::ensure!(p.width > 0 && p.height > 0, "pipeline.width and height must be positive");
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        let catalog = match &self.topics.catalog {
            Some(path) => Catalog::load(&self.resolve(path))?,
            None => Catalog::from_toml_str(DEFAULT_CATALOG)?,
        };
        anyhow::ensure!(!catalog.is_empty(), "topic catalog is empty");
        Ok(catalog)
    }

    pub fn style_profile(&self) -> anyhow::Result<StyleProfile> {
        Ok(match &self.style.profile {
            Some(path) => StyleProfile::load(&self.resolve(path))?,
            None => StyleProfile::from_toml_str(DEFAULT_STYLE)?,
        })
    }

    /// Compiler over the configured profile; budgets are not yet validated.
    pub fn compiler(&self) -> anyhow::Result<InstructionCompiler> {
        Ok(InstructionCompiler::new(self.style_profile()?, self.budget))
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            pages_per_job: self.pipeline.pages_per_job,
            selection: self.topics.selection,
            on_exhausted: self.topics.on_exhausted,
        }
    }

    pub fn runner_config(&self, state_dir: &Path) -> RunnerConfig {
        let p = &self.pipeline;
        RunnerConfig {
            poll_interval: crate::env::poll_interval()
                .unwrap_or(Duration::from_millis(p.poll_interval_ms)),
            page_retries: p.page_retries,
            job_attempts: p.job_attempts,
            fan_out: p.fan_out,
            max_in_flight: p.max_in_flight,
            width: p.width,
            height: p.height,
            output_dir: state_dir.join("output"),
            output_extension: p.output_extension.clone(),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
