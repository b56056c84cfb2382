// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline runner: turns pending jobs into archived documents.
//!
//! Per job:
//!
//! ```text
//! Dispatching -> Generating -> Assembling -> Archiving
//!                    |              |
//!              (page retries)   Retrying -> Failing
//! ```
//!
//! A page that keeps failing after its in-place retries fails the job.
//! Assembly and artifact-write failures re-run assembly with the same pages
//! until the job attempt budget is spent. Cancellation is checked between
//! states and between pages; a cancelled job stays in `pending/`. A job
//! whose store transition fails is released and stays in `pending/` for a
//! later cycle.

use crate::job_logger::JobLogger;
use crate::seed::page_seed;
use bw_adapters::{
    AssemblerAdapter, AssemblyError, GenerationError, GeneratorAdapter, ImageRequest, RasterImage,
};
use bw_core::{Clock, JobDescriptor, JobId, SystemClock};
use bw_prompt::{CompileError, CompiledPrompt, InstructionCompiler};
use bw_storage::{JobStore, StoreError};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors that stop the runner itself (as opposed to failing one job)
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
}

/// Why one attempt at a job did not produce an artifact.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("page {page}: {source}")]
    Compile { page: usize, source: CompileError },
    #[error("page {page} failed after {attempts} attempts: {source}")]
    Generation { page: usize, attempts: u32, source: GenerationError },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("failed to write artifact {path}: {source}")]
    Artifact { path: PathBuf, source: std::io::Error },
    #[error("cancelled")]
    Cancelled,
}

/// Runner state, used as the label in job activity logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Dispatching,
    Generating,
    Assembling,
    Archiving,
    Retrying,
    Failing,
    Cancelled,
}

bw_core::simple_display! {
    RunnerState {
        Dispatching => "dispatching",
        Generating => "generating",
        Assembling => "assembling",
        Archiving => "archiving",
        Retrying => "retrying",
        Failing => "failing",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    /// In-place retries per page after the first attempt.
    pub page_retries: u32,
    /// Assembly attempts per job.
    pub job_attempts: u32,
    /// Pages generated concurrently within one job.
    pub fan_out: usize,
    /// Jobs claimed per cycle.
    pub max_in_flight: usize,
    pub width: u32,
    pub height: u32,
    pub output_dir: PathBuf,
    pub output_extension: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            page_retries: 2,
            job_attempts: 2,
            fan_out: 1,
            max_in_flight: 1,
            width: 592,
            height: 832,
            output_dir: PathBuf::from("output"),
            output_extension: "pdf".to_string(),
        }
    }
}

/// Counters kept for the lifetime of a runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunnerStats {
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub jobs_cancelled: u64,
    pub jobs_requeued: u64,
    pub pages_generated: u64,
    pub page_retries: u64,
    pub job_retries: u64,
}

/// How one claimed job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { artifact: PathBuf },
    Failed { reason: String },
    Cancelled,
    /// The job could not be moved out of `pending/` and will be claimed
    /// again.
    Requeued { error: String },
}

impl JobOutcome {
    /// Whether the job left `pending/`.
    pub fn is_settled(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. } | JobOutcome::Failed { .. })
    }
}

/// Sidecar written next to each artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub job_id: JobId,
    pub topic_id: String,
    pub title: String,
    pub pages: usize,
    pub bytes: usize,
    pub completed_at_ms: u64,
}

pub struct PipelineRunner<G, A, C: Clock = SystemClock> {
    store: Arc<JobStore<C>>,
    compiler: InstructionCompiler,
    generator: G,
    assembler: A,
    config: RunnerConfig,
    logger: JobLogger,
    clock: C,
    stats: Mutex<RunnerStats>,
}

impl<G, A, C> PipelineRunner<G, A, C>
where
    G: GeneratorAdapter,
    A: AssemblerAdapter,
    C: Clock,
{
    pub fn new(
        store: Arc<JobStore<C>>,
        compiler: InstructionCompiler,
        generator: G,
        assembler: A,
        config: RunnerConfig,
        logger: JobLogger,
        clock: C,
    ) -> Self {
        Self {
            store,
            compiler,
            generator,
            assembler,
            config,
            logger,
            clock,
            stats: Mutex::new(RunnerStats::default()),
        }
    }

    pub fn stats(&self) -> RunnerStats {
        *self.stats.lock()
    }

    /// Poll until `cancel` fires, then log and return the final counters.
    pub async fn run_forever(&self, cancel: CancellationToken) -> RunnerStats {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_in_flight = self.config.max_in_flight,
            fan_out = self.config.fan_out,
            "runner started"
        );
        while !cancel.is_cancelled() {
            let idle = match self.run_once(&cancel).await {
                Ok(outcomes) => !outcomes.iter().any(|(_, outcome)| outcome.is_settled()),
                Err(e) => {
                    error!(error = %e, "runner cycle failed");
                    true
                }
            };
            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }

        let stats = self.stats();
        info!(
            jobs_completed = stats.jobs_completed,
            jobs_failed = stats.jobs_failed,
            jobs_cancelled = stats.jobs_cancelled,
            jobs_requeued = stats.jobs_requeued,
            pages_generated = stats.pages_generated,
            page_retries = stats.page_retries,
            job_retries = stats.job_retries,
            "runner stopped"
        );
        stats
    }

    /// One cycle: claim up to `max_in_flight` jobs and process them.
    ///
    /// Returns an empty list when nothing was pending. Fails only when
    /// claiming fails; every claimed job gets an outcome.
    pub async fn run_once(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<(JobId, JobOutcome)>, RunnerError> {
        let mut claimed = Vec::new();
        while claimed.len() < self.config.max_in_flight.max(1) {
            match self.store.claim_next()? {
                Some(job) => claimed.push(job),
                None => break,
            }
        }
        if claimed.is_empty() {
            debug!("no pending jobs");
            return Ok(Vec::new());
        }

        let outcomes = futures_util::future::join_all(
            claimed.iter().map(|job| self.process_job(job, cancel)),
        )
        .await;
        Ok(claimed.into_iter().map(|job| job.job_id).zip(outcomes).collect())
    }

    /// Drive one claimed job, releasing the claim if its store transition
    /// fails.
    async fn process_job(&self, job: &JobDescriptor, cancel: &CancellationToken) -> JobOutcome {
        match self.drive_job(job, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.store.release(&job.job_id);
                let error = e.to_string();
                error!(job_id = %job.job_id, error, "job store transition failed, left pending");
                self.log(job, RunnerState::Cancelled, &format!("left in pending: {error}"));
                self.stats.lock().jobs_requeued += 1;
                JobOutcome::Requeued { error }
            }
        }
    }

    async fn drive_job(
        &self,
        job: &JobDescriptor,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, RunnerError> {
        let id = job.job_id.as_str();
        let pages = job.pages.len();
        info!(job_id = id, topic_id = %job.topic_id, pages, "processing job");
        self.log(
            job,
            RunnerState::Dispatching,
            &format!("topic {} with {pages} pages", job.topic_id),
        );

        let images = match self.generate_pages(job, cancel).await {
            Ok(images) => images,
            Err(JobError::Cancelled) => return Ok(self.cancel_job(job)),
            Err(e) => return self.fail_job(job, &e),
        };

        let attempts = self.config.job_attempts.max(1);
        let mut attempt = 1;
        let artifact = loop {
            if cancel.is_cancelled() {
                return Ok(self.cancel_job(job));
            }
            self.log(job, RunnerState::Assembling, &format!("attempt {attempt}/{attempts}"));
            match self.assemble(job, &images).await {
                Ok(artifact) => break artifact,
                Err(e) if attempt < attempts => {
                    warn!(job_id = id, attempt, error = %e, "assembly failed, retrying");
                    self.log(job, RunnerState::Retrying, &e.to_string());
                    self.stats.lock().job_retries += 1;
                    attempt += 1;
                }
                Err(e) => return self.fail_job(job, &e),
            }
        };

        if cancel.is_cancelled() {
            return Ok(self.cancel_job(job));
        }
        self.store.complete(&job.job_id)?;
        self.log(job, RunnerState::Archiving, &format!("artifact {}", artifact.display()));
        self.stats.lock().jobs_completed += 1;
        info!(job_id = id, artifact = %artifact.display(), "job completed");
        Ok(JobOutcome::Completed { artifact })
    }

    /// Compile every page up front, then generate with bounded fan-out.
    /// Output order follows page order regardless of completion order.
    async fn generate_pages(
        &self,
        job: &JobDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<RasterImage>, JobError> {
        let prompts = job
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                self.compiler
                    .compile(page)
                    .map_err(|source| JobError::Compile { page: index + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fan_out = self.config.fan_out.max(1);
        self.log(
            job,
            RunnerState::Generating,
            &format!("{} pages, fan-out {fan_out}", prompts.len()),
        );
        stream::iter(prompts.into_iter().enumerate())
            .map(|(index, prompt)| self.generate_page(job, index, prompt, cancel))
            .buffered(fan_out)
            .try_collect()
            .await
    }

    async fn generate_page(
        &self,
        job: &JobDescriptor,
        index: usize,
        prompt: CompiledPrompt,
        cancel: &CancellationToken,
    ) -> Result<RasterImage, JobError> {
        let page = index + 1;
        if !prompt.instruction.dropped.is_empty() {
            debug!(
                job_id = %job.job_id,
                page,
                dropped = prompt.instruction.dropped.len(),
                "fragments dropped for budget"
            );
        }
        let (instruction, exclusions) = prompt.into_strings();
        self.logger.append_fenced(
            job.job_id.as_str(),
            &RunnerState::Generating.to_string(),
            &format!("page {page}"),
            &format!("{instruction}\n{exclusions}"),
        );
        let request = ImageRequest {
            instruction,
            exclusions,
            width: self.config.width,
            height: self.config.height,
            seed: page_seed(&job.job_id, index),
        };

        let attempts = self.config.page_retries + 1;
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            match self.generator.generate_image(&request).await {
                Ok(image) => {
                    self.stats.lock().pages_generated += 1;
                    return Ok(image);
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        job_id = %job.job_id,
                        page,
                        attempt,
                        error = %e,
                        "page generation failed, retrying"
                    );
                    self.log(
                        job,
                        RunnerState::Retrying,
                        &format!("page {page} attempt {attempt}: {e}"),
                    );
                    self.stats.lock().page_retries += 1;
                    attempt += 1;
                }
                Err(source) => return Err(JobError::Generation { page, attempts, source }),
            }
        }
    }

    async fn assemble(
        &self,
        job: &JobDescriptor,
        images: &[RasterImage],
    ) -> Result<PathBuf, JobError> {
        let document = self.assembler.assemble(&job.title, images).await?;
        let path = self
            .config
            .output_dir
            .join(format!("{}.{}", job.job_id, self.config.output_extension));
        let meta = ArtifactMeta {
            job_id: job.job_id.clone(),
            topic_id: job.topic_id.clone(),
            title: job.title.clone(),
            pages: images.len(),
            bytes: document.len(),
            completed_at_ms: self.clock.epoch_ms(),
        };
        let meta_bytes = serde_json::to_vec_pretty(&meta)
            .map_err(|e| JobError::Artifact { path: path.clone(), source: e.into() })?;

        write_replace(&path, &document)
            .await
            .map_err(|source| JobError::Artifact { path: path.clone(), source })?;
        let meta_path = self.config.output_dir.join(format!("{}.meta.json", job.job_id));
        write_replace(&meta_path, &meta_bytes)
            .await
            .map_err(|source| JobError::Artifact { path: meta_path, source })?;
        Ok(path)
    }

    fn fail_job(&self, job: &JobDescriptor, e: &JobError) -> Result<JobOutcome, RunnerError> {
        let reason = e.to_string();
        error!(job_id = %job.job_id, reason, "job failed");
        self.log(job, RunnerState::Failing, &reason);
        self.store.fail(&job.job_id, &reason)?;
        self.stats.lock().jobs_failed += 1;
        Ok(JobOutcome::Failed { reason })
    }

    fn cancel_job(&self, job: &JobDescriptor) -> JobOutcome {
        self.store.release(&job.job_id);
        info!(job_id = %job.job_id, "job left pending after cancellation");
        self.log(job, RunnerState::Cancelled, "left in pending");
        self.stats.lock().jobs_cancelled += 1;
        JobOutcome::Cancelled
    }

    fn log(&self, job: &JobDescriptor, state: RunnerState, message: &str) {
        self.logger.append(job.job_id.as_str(), &state.to_string(), message);
    }
}

/// Write `bytes` to `path` through a temp file, replacing any earlier copy.
async fn write_replace(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    let tmp = path.with_file_name(name);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
