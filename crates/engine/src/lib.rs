// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bw-engine: topic generation and the pipeline runner

pub mod job_logger;
pub mod runner;
pub mod seed;
pub mod topic_generator;

pub use job_logger::JobLogger;
pub use runner::{
    ArtifactMeta, JobError, JobOutcome, PipelineRunner, RunnerConfig, RunnerError, RunnerState,
    RunnerStats,
};
pub use seed::{page_seed, scene_seed};
pub use topic_generator::{
    GeneratorConfig, GeneratorError, OnExhausted, Selection, TopicGenerator,
};
