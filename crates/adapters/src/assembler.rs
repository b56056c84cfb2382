// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document assembly collaborator.

use crate::image::RasterImage;
use crate::subprocess::{run_with_timeout, stderr_summary, CommandSpec, ASSEMBLE_TIMEOUT};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from document assembly
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("assembly failed: {0}")]
    Failed(String),
    #[error("assembler produced an empty document")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for turning ordered page images into one document
#[async_trait]
pub trait AssemblerAdapter: Clone + Send + Sync + 'static {
    async fn assemble(&self, title: &str, images: &[RasterImage]) -> Result<Vec<u8>, AssemblyError>;
}

/// Runs an external program once per job.
///
/// Pages are written as `page-001.png`, `page-002.png`, ... into a scratch
/// directory and passed, in order, as trailing arguments. The title is in
/// `BW_TITLE`. The document is read from stdout.
#[derive(Debug, Clone)]
pub struct CommandAssembler {
    spec: CommandSpec,
    work_root: PathBuf,
}

impl CommandAssembler {
    pub fn new(spec: CommandSpec, work_root: impl Into<PathBuf>) -> Self {
        Self { spec, work_root: work_root.into() }
    }

    async fn write_pages(
        dir: &Path,
        images: &[RasterImage],
    ) -> Result<Vec<PathBuf>, AssemblyError> {
        tokio::fs::create_dir_all(dir).await?;
        let mut pages = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let path = dir.join(format!("page-{:03}.png", index + 1));
            tokio::fs::write(&path, &image.data).await?;
            pages.push(path);
        }
        Ok(pages)
    }

    async fn run(
        &self,
        title: &str,
        dir: &Path,
        images: &[RasterImage],
    ) -> Result<Vec<u8>, AssemblyError> {
        let pages = Self::write_pages(dir, images).await?;
        let mut cmd = self.spec.command();
        cmd.args(&pages).env("BW_TITLE", title).current_dir(dir);

        let output =
            run_with_timeout(cmd, None, self.spec.timeout_or(ASSEMBLE_TIMEOUT), &self.spec.program)
                .await
                .map_err(AssemblyError::Failed)?;
        if !output.status.success() {
            return Err(AssemblyError::Failed(stderr_summary(&output)));
        }
        if output.stdout.is_empty() {
            return Err(AssemblyError::Empty);
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl AssemblerAdapter for CommandAssembler {
    async fn assemble(
        &self,
        title: &str,
        images: &[RasterImage],
    ) -> Result<Vec<u8>, AssemblyError> {
        let dir = self.work_root.join(format!("assemble-{}", bw_core::id::random_suffix()));
        tracing::debug!(program = %self.spec.program, pages = images.len(), "running assembler");

        let result = self.run(title, &dir, images).await;
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "failed to remove assembler scratch dir"
            );
        }
        result
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{AssemblerAdapter, AssemblyError};
    use crate::image::RasterImage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded assembly
    #[derive(Debug, Clone)]
    pub struct AssembleCall {
        pub title: String,
        pub pages: Vec<RasterImage>,
    }

    #[derive(Default)]
    struct FakeAssemblerState {
        calls: Vec<AssembleCall>,
        fail_next: usize,
    }

    /// Fake assembler for testing.
    ///
    /// The document is the title followed by each page's data, one per line.
    #[derive(Clone, Default)]
    pub struct FakeAssembler {
        inner: Arc<Mutex<FakeAssemblerState>>,
    }

    impl FakeAssembler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail the next `times` calls.
        pub fn fail_next(&self, times: usize) {
            self.inner.lock().fail_next += times;
        }

        /// Get all recorded assemblies
        pub fn calls(&self) -> Vec<AssembleCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl AssemblerAdapter for FakeAssembler {
        async fn assemble(
            &self,
            title: &str,
            images: &[RasterImage],
        ) -> Result<Vec<u8>, AssemblyError> {
            let mut inner = self.inner.lock();
            inner.calls.push(AssembleCall { title: title.to_string(), pages: images.to_vec() });
            if inner.fail_next > 0 {
                inner.fail_next -= 1;
                return Err(AssemblyError::Failed("layout engine crashed".to_string()));
            }

            let mut doc = title.as_bytes().to_vec();
            for image in images {
                doc.push(b'\n');
                doc.extend_from_slice(&image.data);
            }
            Ok(doc)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{AssembleCall, FakeAssembler};

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
