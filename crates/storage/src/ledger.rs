// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniqueness ledger: append-only record of topics already used.
//!
//! One JSON record per line. The file is the source of truth; the in-memory
//! set is a cache that is refreshed from the tail of the file under an
//! exclusive `flock` before every reservation, so several processes sharing
//! the file never reserve the same topic twice.
//!
//! A record only counts once its terminating newline has been written and
//! synced. On open, unterminated tails and unparsable lines are dropped and
//! the original file is kept as `.bak`.
//!
//! Reset and recovery replace the file at the ledger path. Every handle
//! checks, once it holds the lock, that its open file is still the one at
//! the path and reopens it otherwise, so no handle keeps appending to a
//! rotated-away backup.

use crate::files::{rotate_bak_path, write_atomic};
use bw_core::{Catalog, Clock, SystemClock, TopicEntry};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("all catalog topics have been used; reset the ledger to start over")]
    Exhausted,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line of the ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerRecord {
    /// Topic marked as used.
    Reserve { topic_id: String, first_used_at_ms: u64 },
    /// Compensation for a reservation whose job could not be emitted.
    Release { topic_id: String, released_at_ms: u64, reason: String },
}

/// A topic currently recorded as used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsedTopic {
    pub topic_id: String,
    pub first_used_at_ms: u64,
}

/// Holds an advisory lock on the ledger file until dropped.
struct LockGuard(File);

impl LockGuard {
    fn exclusive(file: &File) -> std::io::Result<Self> {
        let handle = file.try_clone()?;
        FileExt::lock_exclusive(&handle)?;
        Ok(Self(handle))
    }

    fn shared(file: &File) -> std::io::Result<Self> {
        let handle = file.try_clone()?;
        FileExt::lock_shared(&handle)?;
        Ok(Self(handle))
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

pub struct Ledger<C: Clock = SystemClock> {
    path: PathBuf,
    file: File,
    used: HashMap<String, u64>,
    /// Bytes of the file already folded into `used`.
    offset: u64,
    clock: C,
}

impl<C: Clock> Ledger<C> {
    /// Open (or create) the ledger at `path`, recovering from torn writes.
    pub fn open(path: &Path, clock: C) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(path)?;
        let mut ledger =
            Self { path: path.to_path_buf(), file, used: HashMap::new(), offset: 0, clock };
        {
            let _lock = ledger.lock(LockMode::Exclusive)?;
            recover(path)?;
        }
        {
            let _lock = ledger.lock(LockMode::Shared)?;
            ledger.refresh()?;
        }
        info!(path = %path.display(), used = ledger.used.len(), "opened topic ledger");
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically check and record `topic_id`.
    ///
    /// Returns `true` only if the topic was unused and its record is now
    /// durably on disk; `false` if it was already recorded (by this or any
    /// other process).
    pub fn reserve(&mut self, topic_id: &str) -> Result<bool, LedgerError> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.refresh()?;
        if self.used.contains_key(topic_id) {
            debug!(topic_id, "topic already reserved");
            return Ok(false);
        }
        self.discard_torn_tail()?;
        let record = LedgerRecord::Reserve {
            topic_id: topic_id.to_string(),
            first_used_at_ms: self.clock.epoch_ms(),
        };
        self.append(record)?;
        info!(topic_id, "reserved topic");
        Ok(true)
    }

    /// Undo a reservation by appending a release record.
    ///
    /// Returns `false` if the topic was not reserved.
    pub fn release(&mut self, topic_id: &str, reason: &str) -> Result<bool, LedgerError> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.refresh()?;
        if !self.used.contains_key(topic_id) {
            return Ok(false);
        }
        self.discard_torn_tail()?;
        let record = LedgerRecord::Release {
            topic_id: topic_id.to_string(),
            released_at_ms: self.clock.epoch_ms(),
            reason: reason.to_string(),
        };
        self.append(record)?;
        warn!(topic_id, reason, "released topic reservation");
        Ok(true)
    }

    /// Catalog topics not yet used, in catalog order.
    ///
    /// Fails with [`LedgerError::Exhausted`] when every topic has been used.
    pub fn list_unused<'c>(
        &mut self,
        catalog: &'c Catalog,
    ) -> Result<Vec<&'c TopicEntry>, LedgerError> {
        {
            let _lock = self.lock(LockMode::Shared)?;
            self.refresh()?;
        }
        let unused: Vec<_> =
            catalog.topics().iter().filter(|t| !self.used.contains_key(&t.topic_id)).collect();
        if unused.is_empty() {
            return Err(LedgerError::Exhausted);
        }
        Ok(unused)
    }

    /// Whether `topic_id` is recorded, as of the last refresh.
    pub fn contains(&self, topic_id: &str) -> bool {
        self.used.contains_key(topic_id)
    }

    /// Used topics ordered by first use.
    pub fn used(&self) -> Vec<UsedTopic> {
        let mut used: Vec<_> = self
            .used
            .iter()
            .map(|(topic_id, at)| UsedTopic { topic_id: topic_id.clone(), first_used_at_ms: *at })
            .collect();
        used.sort_by(|a, b| {
            a.first_used_at_ms.cmp(&b.first_used_at_ms).then_with(|| a.topic_id.cmp(&b.topic_id))
        });
        used
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Explicit operator reset: move the record file aside and start empty.
    ///
    /// Returns the backup path holding the previous records.
    pub fn reset(&mut self) -> Result<PathBuf, LedgerError> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.refresh()?;
        let bak = rotate_bak_path(&self.path);
        fs::rename(&self.path, &bak)?;
        let cleared = self.used.len();
        self.reopen()?;
        warn!(
            path = %self.path.display(),
            backup = %bak.display(),
            cleared,
            "topic ledger reset by operator"
        );
        Ok(bak)
    }

    /// Lock the file at the ledger path, reopening first if the handle's
    /// file has been replaced by a reset or recovery elsewhere.
    fn lock(&mut self, mode: LockMode) -> Result<LockGuard, LedgerError> {
        loop {
            let guard = match mode {
                LockMode::Shared => LockGuard::shared(&self.file)?,
                LockMode::Exclusive => LockGuard::exclusive(&self.file)?,
            };
            if !self.replaced()? {
                return Ok(guard);
            }
            drop(guard);
            info!(path = %self.path.display(), "topic ledger replaced on disk, reopening");
            self.reopen()?;
        }
    }

    /// Whether the path no longer names the file this handle has open.
    fn replaced(&self) -> Result<bool, LedgerError> {
        let on_disk = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        Ok(file_identity(&self.file.metadata()?) != file_identity(&on_disk))
    }

    /// Open the file at the path afresh and forget the cached records.
    fn reopen(&mut self) -> Result<(), LedgerError> {
        self.file = open_append(&self.path)?;
        self.used.clear();
        self.offset = 0;
        Ok(())
    }

    /// Fold records appended since the last refresh (possibly by another
    /// process). An unterminated tail is left unconsumed.
    fn refresh(&mut self) -> Result<(), LedgerError> {
        self.file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf)?;

        let mut consumed = 0;
        while let Some(pos) = buf[consumed..].iter().position(|b| *b == b'\n') {
            let line = &buf[consumed..consumed + pos];
            consumed += pos + 1;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<LedgerRecord>(line) {
                Ok(record) => self.apply(record),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "skipping corrupt ledger record")
                }
            }
        }
        self.offset += consumed as u64;
        Ok(())
    }

    /// Drop bytes past the last complete record (a writer crashed mid-append).
    /// Caller must hold the exclusive lock.
    fn discard_torn_tail(&mut self) -> Result<(), LedgerError> {
        let len = self.file.metadata()?.len();
        if len > self.offset {
            warn!(
                path = %self.path.display(),
                bytes = len - self.offset,
                "discarding torn ledger record"
            );
            self.file.set_len(self.offset)?;
        }
        Ok(())
    }

    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.sync_data()?;
        self.offset += line.len() as u64;
        self.apply(record);
        Ok(())
    }

    fn apply(&mut self, record: LedgerRecord) {
        match record {
            LedgerRecord::Reserve { topic_id, first_used_at_ms } => {
                self.used.entry(topic_id).or_insert(first_used_at_ms);
            }
            LedgerRecord::Release { topic_id, .. } => {
                self.used.remove(&topic_id);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().read(true).append(true).create(true).open(path)
}

/// Device and inode of a file; equal identities mean the same file.
#[cfg(unix)]
fn file_identity(meta: &fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

// TODO: compare volume serial and file index once the Windows metadata
// accessors are stable; until then a replaced ledger goes unnoticed there.
#[cfg(not(unix))]
fn file_identity(_meta: &fs::Metadata) -> Option<(u64, u64)> {
    None
}

/// Rewrite the ledger keeping only complete, parsable records.
///
/// The original is rotated to `.bak` when anything had to be dropped.
fn recover(path: &Path) -> Result<(), LedgerError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut clean = Vec::with_capacity(bytes.len());
    let mut dropped = 0usize;
    let mut rest = bytes.as_slice();
    while !rest.is_empty() {
        let Some(pos) = rest.iter().position(|b| *b == b'\n') else {
            dropped += 1;
            break;
        };
        let line = &rest[..pos];
        rest = &rest[pos + 1..];
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if serde_json::from_slice::<LedgerRecord>(line).is_ok() {
            clean.extend_from_slice(line);
            clean.push(b'\n');
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        let bak = rotate_bak_path(path);
        warn!(
            path = %path.display(),
            backup = %bak.display(),
            dropped,
            "recovered corrupt ledger; original kept as backup"
        );
        fs::copy(path, &bak)?;
        write_atomic(path, &clean)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
