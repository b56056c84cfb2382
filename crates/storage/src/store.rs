// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job store.
//!
//! Descriptors live as `{job_id}.json` files in one of three directories
//! under the store root. The directory a descriptor sits in is its state:
//!
//! ```text
//! pending/   waiting or being processed
//! archive/   done
//! failed/    failed, with a `{job_id}.reason` record alongside
//! ```
//!
//! Every transition is a single `rename`, so a crash leaves each job in
//! exactly one directory. Claims are in-memory only: after a restart every
//! job still in `pending/` is claimable again.

use crate::files::{sync_dir, tmp_path, write_atomic};
use bw_core::id::is_safe_stem;
use bw_core::{Clock, JobDescriptor, JobId, JobState, SystemClock};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const DESCRIPTOR_EXT: &str = "json";
const REASON_EXT: &str = "reason";

/// Errors that can occur in job store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateJob(JobId),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("invalid job id '{0}'")]
    InvalidId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory a descriptor lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Pending,
    Archive,
    Failed,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Pending, Location::Archive, Location::Failed];

    pub fn dir_name(self) -> &'static str {
        match self {
            Location::Pending => "pending",
            Location::Archive => "archive",
            Location::Failed => "failed",
        }
    }

    /// State implied by the location (claims aside).
    pub fn state(self) -> JobState {
        match self {
            Location::Pending => JobState::Pending,
            Location::Archive => JobState::Done,
            Location::Failed => JobState::Failed,
        }
    }
}

bw_core::simple_display! {
    Location {
        Pending => "pending",
        Archive => "archive",
        Failed => "failed",
    }
}

/// Why a job ended up in `failed/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub job_id: JobId,
    pub reason: String,
    pub failed_at_ms: u64,
}

/// Job counts per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub pending: usize,
    pub processing: usize,
    pub done: usize,
    pub failed: usize,
}

pub struct JobStore<C: Clock = SystemClock> {
    root: PathBuf,
    claims: Mutex<HashSet<JobId>>,
    clock: C,
}

impl<C: Clock> JobStore<C> {
    /// Open the store at `root`, creating its directories and removing
    /// temp files left by interrupted writes.
    pub fn open(root: &Path, clock: C) -> Result<Self, StoreError> {
        for location in Location::ALL {
            let dir = root.join(location.dir_name());
            fs::create_dir_all(&dir)?;
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "tmp") {
                    warn!(path = %path.display(), "removing interrupted write");
                    fs::remove_file(&path)?;
                }
            }
        }
        let store = Self { root: root.to_path_buf(), claims: Mutex::new(HashSet::new()), clock };
        info!(root = %root.display(), "opened job store");
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Durably add a new pending descriptor.
    ///
    /// The file appears under its final name only once fully written.
    pub fn enqueue(&self, descriptor: &JobDescriptor) -> Result<(), StoreError> {
        let job_id = &descriptor.job_id;
        if !is_safe_stem(job_id.as_str()) {
            return Err(StoreError::InvalidId(job_id.to_string()));
        }
        if self.locate(job_id).is_some() {
            return Err(StoreError::DuplicateJob(job_id.clone()));
        }

        let mut stored = descriptor.clone();
        stored.state = JobState::Pending;
        let bytes = serde_json::to_vec_pretty(&stored)?;

        let path = self.path_of(Location::Pending, job_id, DESCRIPTOR_EXT);
        let tmp = tmp_path(&path);
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        // hard_link never replaces an existing file
        let linked = fs::hard_link(&tmp, &path);
        fs::remove_file(&tmp)?;
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::DuplicateJob(job_id.clone()));
            }
            Err(e) => return Err(e.into()),
        }
        sync_dir(&self.dir(Location::Pending));

        info!(
            job_id = %job_id,
            topic_id = %descriptor.topic_id,
            pages = descriptor.pages.len(),
            "enqueued job"
        );
        Ok(())
    }

    /// Claim the oldest unclaimed pending job.
    ///
    /// Unreadable descriptors are moved to `failed/` on the way.
    pub fn claim_next(&self) -> Result<Option<JobDescriptor>, StoreError> {
        let mut pending = self.scan(Location::Pending, true)?;
        pending.sort_by(|a, b| {
            a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.job_id.cmp(&b.job_id))
        });

        let mut claims = self.claims.lock();
        for mut descriptor in pending {
            if claims.insert(descriptor.job_id.clone()) {
                descriptor.state = JobState::Processing;
                debug!(job_id = %descriptor.job_id, "claimed job");
                return Ok(Some(descriptor));
            }
        }
        Ok(None)
    }

    /// Drop a claim without changing the job's location.
    pub fn release(&self, job_id: &JobId) -> bool {
        self.claims.lock().remove(job_id)
    }

    pub fn is_claimed(&self, job_id: &JobId) -> bool {
        self.claims.lock().contains(job_id)
    }

    /// Move a pending job to `archive/`.
    pub fn complete(&self, job_id: &JobId) -> Result<(), StoreError> {
        let from = self.path_of(Location::Pending, job_id, DESCRIPTOR_EXT);
        if !from.exists() {
            return Err(StoreError::NotFound(job_id.clone()));
        }
        let to = self.path_of(Location::Archive, job_id, DESCRIPTOR_EXT);
        fs::rename(&from, &to)?;
        sync_dir(&self.dir(Location::Archive));
        self.claims.lock().remove(job_id);

        info!(job_id = %job_id, "job archived");
        Ok(())
    }

    /// Move a pending job to `failed/`, recording `reason`.
    pub fn fail(&self, job_id: &JobId, reason: &str) -> Result<(), StoreError> {
        let from = self.path_of(Location::Pending, job_id, DESCRIPTOR_EXT);
        if !from.exists() {
            return Err(StoreError::NotFound(job_id.clone()));
        }
        self.write_reason(job_id, reason)?;
        let to = self.path_of(Location::Failed, job_id, DESCRIPTOR_EXT);
        if let Err(e) = fs::rename(&from, &to) {
            let orphan = self.path_of(Location::Failed, job_id, REASON_EXT);
            if let Err(cleanup) = fs::remove_file(&orphan) {
                warn!(
                    job_id = %job_id,
                    error = %cleanup,
                    "failed to remove orphaned failure record"
                );
            }
            return Err(e.into());
        }
        sync_dir(&self.dir(Location::Failed));
        self.claims.lock().remove(job_id);

        warn!(job_id = %job_id, reason, "job failed");
        Ok(())
    }

    /// Move a failed job back to `pending/` for another attempt.
    pub fn retry_failed(&self, job_id: &JobId) -> Result<(), StoreError> {
        let from = self.path_of(Location::Failed, job_id, DESCRIPTOR_EXT);
        if !from.exists() {
            return Err(StoreError::NotFound(job_id.clone()));
        }
        let to = self.path_of(Location::Pending, job_id, DESCRIPTOR_EXT);
        fs::rename(&from, &to)?;
        sync_dir(&self.dir(Location::Pending));
        let reason = self.path_of(Location::Failed, job_id, REASON_EXT);
        if let Err(e) = fs::remove_file(&reason) {
            debug!(job_id = %job_id, error = %e, "no failure record to remove");
        }

        info!(job_id = %job_id, "failed job requeued");
        Ok(())
    }

    /// Which directory holds `job_id`, if any.
    pub fn locate(&self, job_id: &JobId) -> Option<Location> {
        Location::ALL
            .into_iter()
            .find(|loc| self.path_of(*loc, job_id, DESCRIPTOR_EXT).exists())
    }

    /// Read a descriptor with its state derived from its location.
    pub fn load(&self, job_id: &JobId) -> Result<Option<JobDescriptor>, StoreError> {
        let Some(location) = self.locate(job_id) else {
            return Ok(None);
        };
        let bytes = fs::read(self.path_of(location, job_id, DESCRIPTOR_EXT))?;
        let mut descriptor: JobDescriptor = serde_json::from_slice(&bytes)?;
        descriptor.state = self.state_at(location, job_id);
        Ok(Some(descriptor))
    }

    /// Readable descriptors in `location`, oldest first.
    pub fn list(&self, location: Location) -> Result<Vec<JobDescriptor>, StoreError> {
        let mut jobs = self.scan(location, false)?;
        jobs.sort_by(|a, b| {
            a.created_at_ms.cmp(&b.created_at_ms).then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(jobs)
    }

    /// Failure records, oldest first.
    pub fn failures(&self) -> Result<Vec<FailureRecord>, StoreError> {
        let mut records: Vec<FailureRecord> = Vec::new();
        for path in self.files(Location::Failed, REASON_EXT)? {
            let parsed = fs::read(&path)
                .map_err(StoreError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<FailureRecord>(&bytes)?));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "unreadable failure record"),
            }
        }
        records.sort_by(|a, b| {
            a.failed_at_ms.cmp(&b.failed_at_ms).then_with(|| a.job_id.cmp(&b.job_id))
        });
        Ok(records)
    }

    pub fn failure(&self, job_id: &JobId) -> Result<Option<FailureRecord>, StoreError> {
        let path = self.path_of(Location::Failed, job_id, REASON_EXT);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let pending = self.files(Location::Pending, DESCRIPTOR_EXT)?.len();
        let processing = self.claims.lock().len().min(pending);
        Ok(StoreCounts {
            pending: pending - processing,
            processing,
            done: self.files(Location::Archive, DESCRIPTOR_EXT)?.len(),
            failed: self.files(Location::Failed, DESCRIPTOR_EXT)?.len(),
        })
    }

    fn dir(&self, location: Location) -> PathBuf {
        self.root.join(location.dir_name())
    }

    fn path_of(&self, location: Location, job_id: &JobId, ext: &str) -> PathBuf {
        self.dir(location).join(format!("{job_id}.{ext}"))
    }

    fn state_at(&self, location: Location, job_id: &JobId) -> JobState {
        if location == Location::Pending && self.is_claimed(job_id) {
            JobState::Processing
        } else {
            location.state()
        }
    }

    fn files(&self, location: Location, ext: &str) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(self.dir(location))? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == ext) && path.is_file() {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Parse every descriptor in `location`. With `quarantine`, unreadable
    /// ones are moved to `failed/`; otherwise they are skipped.
    fn scan(&self, location: Location, quarantine: bool) -> Result<Vec<JobDescriptor>, StoreError> {
        let mut jobs = Vec::new();
        for path in self.files(location, DESCRIPTOR_EXT)? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).and_then(JobId::parse)
            else {
                warn!(path = %path.display(), "ignoring descriptor with unsafe file name");
                continue;
            };
            let parsed = fs::read(&path)
                .map_err(StoreError::from)
                .and_then(|bytes| Ok(serde_json::from_slice::<JobDescriptor>(&bytes)?));
            let reason = match parsed {
                Ok(descriptor) if descriptor.job_id == stem => {
                    let mut descriptor = descriptor;
                    descriptor.state = self.state_at(location, &stem);
                    jobs.push(descriptor);
                    continue;
                }
                Ok(descriptor) => {
                    format!("descriptor id {} does not match file name", descriptor.job_id)
                }
                Err(e) => format!("unreadable descriptor: {e}"),
            };
            if quarantine {
                self.quarantine(&path, &stem, &reason)?;
            } else {
                warn!(path = %path.display(), reason, "skipping descriptor");
            }
        }
        Ok(jobs)
    }

    fn quarantine(&self, path: &Path, job_id: &JobId, reason: &str) -> Result<(), StoreError> {
        self.write_reason(job_id, reason)?;
        fs::rename(path, self.path_of(Location::Failed, job_id, DESCRIPTOR_EXT))?;
        sync_dir(&self.dir(Location::Failed));
        warn!(job_id = %job_id, reason, "moved unreadable descriptor to failed");
        Ok(())
    }

    fn write_reason(&self, job_id: &JobId, reason: &str) -> Result<(), StoreError> {
        let record = FailureRecord {
            job_id: job_id.clone(),
            reason: reason.to_string(),
            failed_at_ms: self.clock.epoch_ms(),
        };
        write_atomic(
            &self.path_of(Location::Failed, job_id, REASON_EXT),
            &serde_json::to_vec_pretty(&record)?,
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
