// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small filesystem helpers shared by the ledger and the job store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        if let Err(e) = fs::remove_file(&oldest) {
            tracing::warn!(path = %oldest.display(), error = %e, "failed to remove oldest backup");
        }
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let dst = bak(n + 1);
            if let Err(e) = fs::rename(&src, &dst) {
                tracing::warn!(
                    from = %src.display(),
                    to = %dst.display(),
                    error = %e,
                    "failed to rotate backup"
                );
            }
        }
    }

    bak(1)
}

/// Temp path next to `path`, never matched by `*.json` scans.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with `bytes` via temp file + fsync + rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

/// Persist directory entries (renames, creates). Best effort: some
/// platforms cannot open directories for syncing.
pub(crate) fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        if let Err(e) = handle.sync_all() {
            tracing::debug!(dir = %dir.display(), error = %e, "directory sync failed");
        }
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
