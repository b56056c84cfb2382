// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job descriptor: one content-generation request spanning multiple pages.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job descriptor.
    ///
    /// Also the file stem of the descriptor inside the job store.
    pub struct JobId("job-");
}

/// Lifecycle state of a job.
///
/// The job store location is authoritative: `pending/` holds `Pending` and
/// `Processing` jobs (the latter only as an in-memory claim), `archive/`
/// holds `Done`, `failed/` holds `Failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Pending,
    Processing,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

crate::simple_display! {
    JobState {
        Pending => "pending",
        Processing => "processing",
        Done => "done",
        Failed => "failed",
    }
}

/// One page of a job. Owned by its descriptor, never shared across jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub is_cover: bool,
    pub subject: String,
    pub scene: String,
}

impl PageSpec {
    pub fn cover(subject: impl Into<String>, scene: impl Into<String>) -> Self {
        Self { is_cover: true, subject: subject.into(), scene: scene.into() }
    }

    pub fn content(subject: impl Into<String>, scene: impl Into<String>) -> Self {
        Self { is_cover: false, subject: subject.into(), scene: scene.into() }
    }
}

/// Durable record of one job, serialized as one JSON file in the job store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: JobId,
    pub topic_id: String,
    pub title: String,
    pub pages: Vec<PageSpec>,
    pub created_at_ms: u64,
    /// Filled in from the store location when loaded; the file on disk
    /// keeps the value it was enqueued with.
    #[serde(default)]
    pub state: JobState,
}

impl JobDescriptor {
    pub fn cover(&self) -> Option<&PageSpec> {
        self.pages.iter().find(|p| p.is_cover)
    }

    pub fn content_pages(&self) -> impl Iterator<Item = &PageSpec> {
        self.pages.iter().filter(|p| !p.is_cover)
    }
}

crate::builder! {
    pub struct JobDescriptorBuilder => JobDescriptor {
        into {
            job_id: JobId = "job-test",
            topic_id: String = "fruit",
            title: String = "Fruit Coloring Book TEST",
        }
        set {
            pages: Vec<PageSpec> = vec![
                PageSpec::cover("Fruit collection", "apple, pear together"),
                PageSpec::content("apple", "apple"),
                PageSpec::content("pear", "pear"),
            ],
            created_at_ms: u64 = 1_000_000,
        }
        computed {
            state: JobState = JobState::Pending,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
