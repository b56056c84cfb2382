// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image generation collaborator.

use crate::image::RasterImage;
use crate::subprocess::{run_with_timeout, stderr_summary, CommandSpec, GENERATE_TIMEOUT};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors from image generation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Failed(String),
    #[error("generator returned no image data")]
    Empty,
}

/// Everything the generator needs to render one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub instruction: String,
    pub exclusions: String,
    pub width: u32,
    pub height: u32,
    /// Same seed and instructions must yield the same image.
    pub seed: u64,
}

/// Adapter for turning compiled instructions into a raster image
#[async_trait]
pub trait GeneratorAdapter: Clone + Send + Sync + 'static {
    async fn generate_image(&self, request: &ImageRequest) -> Result<RasterImage, GenerationError>;
}

/// Runs an external program per page.
///
/// The request is written to stdin as JSON; the encoded image is read from
/// stdout. A non-zero exit, a timeout or empty output is a failure.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    spec: CommandSpec,
}

impl CommandGenerator {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl GeneratorAdapter for CommandGenerator {
    async fn generate_image(&self, request: &ImageRequest) -> Result<RasterImage, GenerationError> {
        let stdin =
            serde_json::to_vec(request).map_err(|e| GenerationError::Failed(e.to_string()))?;
        let mut cmd = self.spec.command();
        cmd.env("BW_WIDTH", request.width.to_string())
            .env("BW_HEIGHT", request.height.to_string())
            .env("BW_SEED", request.seed.to_string());

        tracing::debug!(program = %self.spec.program, seed = request.seed, "running generator");
        let output = run_with_timeout(
            cmd,
            Some(stdin),
            self.spec.timeout_or(GENERATE_TIMEOUT),
            &self.spec.program,
        )
        .await
        .map_err(GenerationError::Failed)?;

        if !output.status.success() {
            return Err(GenerationError::Failed(stderr_summary(&output)));
        }
        if output.stdout.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(RasterImage::new(request.width, request.height, output.stdout))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{GenerationError, GeneratorAdapter, ImageRequest};
    use crate::image::RasterImage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeGeneratorState {
        calls: Vec<ImageRequest>,
        fail_next: VecDeque<String>,
        fail_when: Vec<(String, String)>,
        delay_when: Vec<(String, Duration)>,
    }

    /// Fake generator for testing.
    ///
    /// Returns `"{seed}|{instruction}"` as image data so callers can check
    /// which page ended up where.
    #[derive(Clone, Default)]
    pub struct FakeGenerator {
        inner: Arc<Mutex<FakeGeneratorState>>,
    }

    impl FakeGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `times` calls with `reason`.
        pub fn fail_next(&self, times: usize, reason: &str) {
            let mut inner = self.inner.lock();
            inner.fail_next.extend((0..times).map(|_| reason.to_string()));
        }

        /// Always fail calls whose instruction contains `needle`.
        pub fn fail_when(&self, needle: &str, reason: &str) {
            self.inner.lock().fail_when.push((needle.to_string(), reason.to_string()));
        }

        /// Delay calls whose instruction contains `needle`.
        pub fn delay_when(&self, needle: &str, delay: Duration) {
            self.inner.lock().delay_when.push((needle.to_string(), delay));
        }

        /// Get all recorded requests
        pub fn calls(&self) -> Vec<ImageRequest> {
            self.inner.lock().calls.clone()
        }

        pub fn call_count(&self) -> usize {
            self.inner.lock().calls.len()
        }
    }

    #[async_trait]
    impl GeneratorAdapter for FakeGenerator {
        async fn generate_image(
            &self,
            request: &ImageRequest,
        ) -> Result<RasterImage, GenerationError> {
            let delay = {
                let mut inner = self.inner.lock();
                inner.calls.push(request.clone());
                inner
                    .delay_when
                    .iter()
                    .find(|(needle, _)| request.instruction.contains(needle.as_str()))
                    .map(|(_, d)| *d)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let failure = {
                let mut inner = self.inner.lock();
                match inner.fail_next.pop_front() {
                    Some(reason) => Some(reason),
                    None => inner
                        .fail_when
                        .iter()
                        .find(|(needle, _)| request.instruction.contains(needle.as_str()))
                        .map(|(_, reason)| reason.clone()),
                }
            };
            if let Some(reason) = failure {
                return Err(GenerationError::Failed(reason));
            }

            let data = format!("{}|{}", request.seed, request.instruction).into_bytes();
            Ok(RasterImage::new(request.width, request.height, data))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGenerator;

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
